//! Cooperative cancellation for blocking waits and in-flight renders.
//!
//! A [`CancelToken`] is an explicit, typed replacement for ambient thread
//! interruption: the caller that wants to be able to give up on a blocking
//! retrieval passes a token into it, and whoever holds a clone of the token
//! fires it. The render pipeline itself carries one token per task so that a
//! cancelled render can unwind at its suspension points (the settle sleep and
//! the UI-thread hops).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::time::{Duration, Instant};

/// Wake-up hook for waiters parked on a publish-once slot.
///
/// Implementations must acquire the same lock their waiters hold around the
/// park-and-recheck loop before notifying; otherwise a wake can be lost
/// between the waiter's flag check and its park.
pub(crate) trait Notify: Send + Sync {
    fn notify(&self);
}

struct TokenInner {
    cancelled: AtomicBool,
    // parked `sleep` calls wait on this pair
    sleep_lock: Mutex<()>,
    sleep_cond: Condvar,
    watchers: Mutex<Vec<Weak<dyn Notify>>>,
}

/// A cloneable cancellation token.
///
/// All clones observe the same state; `cancel` is idempotent and permanent.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                sleep_lock: Mutex::new(()),
                sleep_cond: Condvar::new(),
                watchers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Fire the token. Any parked [`CancelToken::sleep`] returns early and
    /// every registered waiter is woken so it can observe the flag.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        {
            let _guard = lock(&self.inner.sleep_lock);
            self.inner.sleep_cond.notify_all();
        }
        let watchers = std::mem::take(&mut *lock(&self.inner.watchers));
        for watcher in watchers {
            if let Some(w) = watcher.upgrade() {
                w.notify();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Suspend the calling thread for `duration`, waking early if the token
    /// fires. Returns `true` when the full duration elapsed uncancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = lock(&self.inner.sleep_lock);
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let (g, _timed_out) = self
                .inner
                .sleep_cond
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            guard = g;
        }
    }

    /// Register a waiter to be woken when the token fires. Stale entries are
    /// purged on the way in; an already-fired token notifies immediately.
    pub(crate) fn watch(&self, waiter: Weak<dyn Notify>) {
        {
            let mut watchers = lock(&self.inner.watchers);
            watchers.retain(|w| w.strong_count() > 0);
            watchers.push(waiter.clone());
        }
        if self.is_cancelled() {
            if let Some(w) = waiter.upgrade() {
                w.notify();
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
