//! The shared UI-affinity thread.
//!
//! GUI toolkits demand that widgets be built, painted, and torn down on one
//! dedicated thread. This module stands in for that constraint: a single
//! process-wide worker thread, started lazily, that executes submitted jobs
//! strictly in submission order. Everything else in the crate talks to it
//! through [`invoke_and_wait`] / [`invoke_and_wait_cancellable`].
//!
//! Widgets never leave this thread. Jobs deposit built widgets into a
//! thread-local registry keyed by a pre-allocated [`WidgetHandle`] and later
//! withdraw them for capture; a render abandoned between the two hops queues
//! a fire-and-forget dispose job, which the FIFO guarantee orders after the
//! build.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, ThreadId};

use log::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::slot::Slot;
use crate::toolkit::Widget;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct UiThread {
    tx: Mutex<Sender<Job>>,
    id: ThreadId,
}

static UI_THREAD: OnceLock<UiThread> = OnceLock::new();

fn ui() -> &'static UiThread {
    UI_THREAD.get_or_init(|| {
        let (tx, rx) = mpsc::channel::<Job>();
        let handle = thread::spawn(move || {
            debug!("UI thread started");
            while let Ok(job) = rx.recv() {
                job();
            }
        });
        UiThread {
            id: handle.thread().id(),
            tx: Mutex::new(tx),
        }
    })
}

/// Whether the calling thread is the UI thread.
pub(crate) fn is_ui_thread() -> bool {
    thread::current().id() == ui().id
}

/// Submit `job` to the UI thread and block until it has run, returning its
/// result. Toolkit failures and job panics both surface as
/// [`Error::InternalFault`]; the UI thread itself survives either.
///
/// Must not be called from the UI thread: the job would queue behind the
/// caller and never run.
pub(crate) fn invoke_and_wait<R, F>(job: F) -> Result<R>
where
    R: Clone + Send + Sync + 'static,
    F: FnOnce() -> anyhow::Result<R> + Send + 'static,
{
    submit(job).wait()
}

/// As [`invoke_and_wait`], but gives up when `token` fires. The job itself
/// still runs at its queued position either way; only its reply is discarded.
pub(crate) fn invoke_and_wait_cancellable<R, F>(job: F, token: &CancelToken) -> Result<R>
where
    R: Clone + Send + Sync + 'static,
    F: FnOnce() -> anyhow::Result<R> + Send + 'static,
{
    submit(job).wait_cancellable(token)
}

fn submit<R, F>(job: F) -> Arc<Slot<R>>
where
    R: Clone + Send + Sync + 'static,
    F: FnOnce() -> anyhow::Result<R> + Send + 'static,
{
    assert!(
        !is_ui_thread(),
        "invoke_and_wait called from the UI thread itself"
    );
    let slot: Arc<Slot<R>> = Slot::new();
    let reply = slot.clone();
    let boxed: Job = Box::new(move || {
        match catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(value)) => {
                reply.publish(value);
            }
            Ok(Err(err)) => {
                reply.fail(Error::InternalFault(format!("{err:#}")));
            }
            Err(panic) => {
                reply.fail(Error::InternalFault(panic_message(panic)));
            }
        };
    });
    let send_failed = {
        let tx = ui().tx.lock().unwrap_or_else(|e| e.into_inner());
        tx.send(boxed).is_err()
    };
    if send_failed {
        warn!("UI thread is gone; failing submitted job");
        slot.fail(Error::InternalFault("UI thread is gone".to_string()));
    }
    slot
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("UI job panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("UI job panicked: {msg}")
    } else {
        "UI job panicked".to_string()
    }
}

// --- widget registry (UI thread only) ---

thread_local! {
    static WIDGETS: RefCell<HashMap<u64, Box<dyn Widget>>> = RefCell::new(HashMap::new());
}

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identifies a widget parked in the UI thread's registry between the build
/// and capture hops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WidgetHandle(u64);

impl WidgetHandle {
    pub(crate) fn alloc() -> Self {
        WidgetHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Park a freshly built widget. UI thread only.
pub(crate) fn deposit(handle: WidgetHandle, widget: Box<dyn Widget>) {
    debug_assert!(is_ui_thread());
    WIDGETS.with(|w| w.borrow_mut().insert(handle.0, widget));
}

/// Take a parked widget back out. UI thread only.
pub(crate) fn withdraw(handle: WidgetHandle) -> Option<Box<dyn Widget>> {
    debug_assert!(is_ui_thread());
    WIDGETS.with(|w| w.borrow_mut().remove(&handle.0))
}

/// Queue a job that drops the widget parked under `handle`, if any. Used when
/// a render is abandoned after its build hop was already submitted.
pub(crate) fn dispose_async(handle: WidgetHandle) {
    let boxed: Job = Box::new(move || {
        if withdraw(handle).is_some() {
            debug!("disposed orphaned widget {handle:?}");
        }
    });
    let tx = ui().tx.lock().unwrap_or_else(|e| e.into_inner());
    let _ = tx.send(boxed);
}
