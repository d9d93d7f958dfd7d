//! Error types for the render-and-capture core

use thiserror::Error;

/// Result type alias for render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering or retrieving a rendered image
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A blocking wait was cancelled, or the render it was waiting on was
    /// abandoned before an image could be produced.
    #[error("render interrupted before an image was produced")]
    Interrupted,

    /// A defensive invariant tripped, or the widget toolkit reported an
    /// unexpected failure while executing on the UI thread. Not expected in
    /// correct usage; the affected task is unrecoverable.
    #[error("internal fault: {0}")]
    InternalFault(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::InternalFault(format!("{err:#}"))
    }
}
