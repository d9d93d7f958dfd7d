//! The asynchronous render-and-capture task.
//!
//! A [`RenderTask`] owns one render request end to end: it spawns a dedicated
//! orchestration thread which hops onto the UI thread twice, once to build
//! the widget and once to capture and dispose it, with the settle delay in
//! between. The produced image lands in a publish-once slot that any number
//! of callers can poll or block on.
//!
//! Cancellation is explicit. A fired [`CancelToken`] handed to
//! [`RenderTask::wait_cancellable`], or a direct [`RenderTask::cancel`],
//! abandons the render: the orchestration thread unwinds at its next
//! suspension point and the task never completes. Abandonment surfaces as
//! [`Error::Interrupted`] to every blocking wait, including the token-less
//! [`RenderTask::wait`], so nobody deadlocks on an image that will never
//! arrive. An interrupted render is abandoned, not resumed.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::RgbaImage;
use log::debug;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::slot::Slot;
use crate::toolkit::{markup::MarkupToolkit, Toolkit};
use crate::ui;

/// Settle window between widget construction and capture, giving
/// asynchronous sub-resource loads (embedded images and the like) a chance to
/// finish. Best effort: loads slower than this still miss the capture.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// One in-flight (or finished, or abandoned) render request.
pub struct RenderTask {
    slot: Arc<Slot<Arc<RgbaImage>>>,
    abort: CancelToken,
}

impl RenderTask {
    /// Start rendering `document` with the default settle delay. Returns
    /// immediately; the render proceeds on background threads.
    pub fn prepare(document: &str) -> Result<Self> {
        Self::prepare_with_delay(document, DEFAULT_SETTLE_DELAY)
    }

    /// Start rendering `document` with an explicit settle delay.
    pub fn prepare_with_delay(document: &str, settle_delay: Duration) -> Result<Self> {
        Self::prepare_with(Arc::new(MarkupToolkit::new()), document, settle_delay)
    }

    /// Start rendering `document` through a specific widget toolkit.
    ///
    /// # Panics
    ///
    /// Panics when called from the UI thread: the orchestration protocol
    /// requires the caller and the UI thread to be different execution
    /// contexts.
    pub fn prepare_with(
        toolkit: Arc<dyn Toolkit>,
        document: &str,
        settle_delay: Duration,
    ) -> Result<Self> {
        assert!(
            !ui::is_ui_thread(),
            "RenderTask::prepare called from the UI thread"
        );
        let slot: Arc<Slot<Arc<RgbaImage>>> = Slot::new();
        let abort = CancelToken::new();

        let worker_slot = slot.clone();
        let worker_abort = abort.clone();
        let document = document.to_string();
        let _ = thread::Builder::new()
            .name("htmlshot-render".to_string())
            .spawn(move || orchestrate(toolkit, document, settle_delay, worker_slot, worker_abort))
            .map_err(|e| {
                Error::InternalFault(format!("failed to spawn render orchestration: {e}"))
            })?;

        Ok(Self { slot, abort })
    }

    /// Whether the rendered image is available. Never blocks, never fails,
    /// and stays `false` forever for abandoned renders.
    pub fn is_done(&self) -> bool {
        self.slot.is_ready()
    }

    /// The rendered image, if available. Never blocks.
    pub fn image(&self) -> Option<Arc<RgbaImage>> {
        self.slot.peek()
    }

    /// Block until the image is available. This wait takes no token and
    /// absorbs cancellation requests aimed at other waiters; it only fails,
    /// with [`Error::Interrupted`] or an internal fault, when the render
    /// itself can no longer complete.
    pub fn wait(&self) -> Result<Arc<RgbaImage>> {
        self.slot.wait()
    }

    /// Block until the image is available or `token` fires, whichever comes
    /// first. A fired token fails this call with [`Error::Interrupted`] and
    /// abandons the render.
    pub fn wait_cancellable(&self, token: &CancelToken) -> Result<Arc<RgbaImage>> {
        let result = self.slot.wait_cancellable(token);
        if matches!(result, Err(Error::Interrupted)) && token.is_cancelled() {
            self.cancel();
        }
        result
    }

    /// Abandon the render. The orchestration thread unwinds at its next
    /// suspension point, pending waiters fail with [`Error::Interrupted`],
    /// and the task never reports done. A no-op once the image is published.
    pub fn cancel(&self) {
        if self.slot.fail(Error::Interrupted) {
            debug!("render abandoned before completion");
        }
        self.abort.cancel();
    }
}

/// Runs once per task on its own thread: build hop, settle window, capture
/// hop, publish.
fn orchestrate(
    toolkit: Arc<dyn Toolkit>,
    document: String,
    settle_delay: Duration,
    slot: Arc<Slot<Arc<RgbaImage>>>,
    abort: CancelToken,
) {
    assert!(
        !ui::is_ui_thread(),
        "render orchestration ran on the UI thread"
    );

    if abort.is_cancelled() {
        slot.fail(Error::Interrupted);
        return;
    }

    // hop 1: build the widget, park it on the UI thread
    let handle = ui::WidgetHandle::alloc();
    let build_toolkit = toolkit.clone();
    let build_document = document;
    let built: Result<(u32, u32)> = ui::invoke_and_wait_cancellable(
        move || {
            let widget = build_toolkit.build(&build_document)?;
            let size = widget.size();
            ui::deposit(handle, widget);
            Ok(size)
        },
        &abort,
    );
    match built {
        Ok(_size) => {}
        Err(Error::Interrupted) => {
            // the build job may still run at its queued position; reclaim
            // whatever it parks
            ui::dispose_async(handle);
            slot.fail(Error::Interrupted);
            return;
        }
        Err(fault) => {
            slot.fail(fault);
            return;
        }
    }

    // settle window for asynchronous sub-resource loads
    if !abort.sleep(settle_delay) {
        ui::dispose_async(handle);
        slot.fail(Error::Interrupted);
        return;
    }

    // hop 2: capture the painted surface, dispose the widget
    let captured: Result<Arc<RgbaImage>> = ui::invoke_and_wait_cancellable(
        move || {
            let widget = ui::withdraw(handle)
                .ok_or_else(|| anyhow::anyhow!("widget missing from the UI registry"))?;
            widget.paint().map(Arc::new)
        },
        &abort,
    );
    match captured {
        Ok(image) => {
            if !slot.publish(image) {
                debug!("render finished after abandonment; image discarded");
            }
        }
        Err(Error::Interrupted) => {
            // the capture job withdraws and drops the widget when it runs
            slot.fail(Error::Interrupted);
        }
        Err(fault) => {
            slot.fail(fault);
        }
    }
}
