//! htmlshot
//!
//! Renders markup documents into pixel images by driving an off-screen
//! widget through a single-threaded UI context, waiting a settle window for
//! asynchronous sub-resources, then capturing the widget's painted surface.
//! A companion [`compare`] module performs exact pixel equality between two
//! captures.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> htmlshot::Result<()> {
//! // one-shot blocking render
//! let image = htmlshot::render("<p>Hello</p>")?;
//! println!("{}x{}", image.width(), image.height());
//!
//! // or monitor the render without blocking
//! let task = htmlshot::RenderTask::prepare("<p>Hello</p>")?;
//! while !task.is_done() {
//!     // do something else
//! }
//! let again = task.image().expect("done");
//! assert!(htmlshot::compare::equals(Some(&*image), Some(&*again)));
//! # Ok(())
//! # }
//! ```
//!
//! Retrieval comes in two flavours: [`RenderTask::wait`] blocks until the
//! image exists and absorbs cancellation requests aimed at other callers,
//! while [`RenderTask::wait_cancellable`] gives up (and abandons the render)
//! when the [`CancelToken`] passed to it fires.

pub mod error;
pub use error::{Error, Result};

pub mod cancel;
pub mod compare;
pub mod toolkit;

mod slot;
mod task;
mod ui;

pub use cancel::CancelToken;
pub use task::{RenderTask, DEFAULT_SETTLE_DELAY};
pub use toolkit::{markup::MarkupToolkit, Toolkit, Widget};

// Re-export the pixel buffer type produced by widget capture
pub use image::RgbaImage;

use std::sync::Arc;
use std::time::Duration;

/// Render `document` with the default settle delay and block until the image
/// is available.
pub fn render(document: &str) -> Result<Arc<RgbaImage>> {
    RenderTask::prepare(document)?.wait()
}

/// Render `document` with an explicit settle delay and block until the image
/// is available.
pub fn render_with_delay(document: &str, settle_delay: Duration) -> Result<Arc<RgbaImage>> {
    RenderTask::prepare_with_delay(document, settle_delay)?.wait()
}

/// Render `document`, blocking until the image is available or `token`
/// fires. A fired token fails with [`Error::Interrupted`] and abandons the
/// render.
pub fn render_cancellable(
    document: &str,
    settle_delay: Duration,
    token: &CancelToken,
) -> Result<Arc<RgbaImage>> {
    RenderTask::prepare_with_delay(document, settle_delay)?.wait_cancellable(token)
}
