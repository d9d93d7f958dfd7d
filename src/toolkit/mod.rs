//! Widget toolkit abstraction.
//!
//! The render core treats widget construction and capture as an opaque
//! collaborator. Backends implement [`Toolkit`] and [`Widget`]; the built-in
//! [`MarkupToolkit`](markup::MarkupToolkit) is a deterministic stand-in for a
//! real GUI toolkit, good enough for tests and golden images.
//!
//! Widgets are UI-thread-affine by contract: they are built, painted, and
//! dropped on the UI thread, and `Widget` is deliberately not `Send`.

pub mod layout;
pub mod markup;
pub mod raster;

use image::RgbaImage;

/// A displayable, non-resizable widget packed to its content.
pub trait Widget: 'static {
    /// Packed size in pixels, fixed at build time.
    fn size(&self) -> (u32, u32);

    /// Capture the widget's current painted surface into an off-screen pixel
    /// buffer. The image dimensions equal [`Widget::size`].
    fn paint(&self) -> anyhow::Result<RgbaImage>;
}

/// Factory for widgets bound to a markup document.
pub trait Toolkit: Send + Sync + 'static {
    /// Construct a widget displaying `document`, packed to its content.
    ///
    /// Called on the UI thread. Failures are propagated to waiting callers as
    /// internal faults.
    fn build(&self, document: &str) -> anyhow::Result<Box<dyn Widget>>;
}
