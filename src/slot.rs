//! Publish-once result slot.
//!
//! A [`Slot`] is a single-writer, multi-reader cell: the producing thread
//! publishes a value (or a failure) exactly once, and any number of readers
//! peek or block on it. It backs both the per-task image result and the reply
//! of every job submitted to the UI thread.

use std::sync::{Arc, Condvar, Mutex};

use crate::cancel::{CancelToken, Notify};
use crate::error::{Error, Result};

enum State<T> {
    Pending,
    Ready(T),
    Failed(Error),
}

pub(crate) struct Slot<T> {
    state: Mutex<State<T>>,
    cond: Condvar,
}

impl<T: Clone + Send + 'static> Slot<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::Pending),
            cond: Condvar::new(),
        })
    }

    /// Publish the value. The first publish or failure wins; anything later
    /// is ignored. Returns whether this call was the winning write.
    pub(crate) fn publish(&self, value: T) -> bool {
        let mut state = self.lock_state();
        match *state {
            State::Pending => {
                *state = State::Ready(value);
                self.cond.notify_all();
                true
            }
            _ => false,
        }
    }

    /// Record a terminal failure so waiters unblock with an error instead of
    /// parking forever. Same first-write-wins rule as [`Slot::publish`].
    pub(crate) fn fail(&self, err: Error) -> bool {
        let mut state = self.lock_state();
        match *state {
            State::Pending => {
                *state = State::Failed(err);
                self.cond.notify_all();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(*self.lock_state(), State::Ready(_))
    }

    pub(crate) fn peek(&self) -> Option<T> {
        match &*self.lock_state() {
            State::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Block until the slot settles. Insulated from cancellation: no token is
    /// consulted, so external cancel requests aimed at other waiters are
    /// absorbed here and waiting simply continues.
    pub(crate) fn wait(&self) -> Result<T> {
        let mut state = self.lock_state();
        loop {
            match &*state {
                State::Ready(value) => return Ok(value.clone()),
                State::Failed(err) => return Err(err.clone()),
                State::Pending => {
                    state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
                }
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Slot<T> {
    /// Block until the slot settles or `token` fires, whichever happens
    /// first. A fired token surfaces as [`Error::Interrupted`]; a settled
    /// slot always wins when both are observable.
    pub(crate) fn wait_cancellable(self: &Arc<Self>, token: &CancelToken) -> Result<T> {
        token.watch(Arc::downgrade(self) as std::sync::Weak<dyn Notify>);
        let mut state = self.lock_state();
        loop {
            match &*state {
                State::Ready(value) => return Ok(value.clone()),
                State::Failed(err) => return Err(err.clone()),
                State::Pending => {}
            }
            if token.is_cancelled() {
                return Err(Error::Interrupted);
            }
            state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
        }
    }
}

impl<T> Slot<T> {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Send + Sync> Notify for Slot<T> {
    fn notify(&self) {
        // taking the state lock orders this wake after any in-progress
        // check-then-park in the wait loops
        let _guard = self.lock_state();
        self.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn publish_is_first_write_wins() {
        let slot: Arc<Slot<u32>> = Slot::new();
        assert!(slot.peek().is_none());
        assert!(!slot.is_ready());

        assert!(slot.publish(7));
        assert!(!slot.publish(8));
        assert!(!slot.fail(Error::Interrupted));

        assert!(slot.is_ready());
        assert_eq!(slot.peek(), Some(7));
        assert_eq!(slot.wait().expect("slot settled"), 7);
    }

    #[test]
    fn failure_unblocks_waiters() {
        let slot: Arc<Slot<u32>> = Slot::new();
        let remote = slot.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.fail(Error::Interrupted);
        });
        assert!(matches!(slot.wait(), Err(Error::Interrupted)));
        assert!(!slot.is_ready());
        assert!(slot.peek().is_none());
    }

    #[test]
    fn wait_cancellable_observes_fired_token() {
        let slot: Arc<Slot<u32>> = Slot::new();
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            slot.wait_cancellable(&token),
            Err(Error::Interrupted)
        ));
    }

    #[test]
    fn wait_cancellable_wakes_when_token_fires_mid_wait() {
        let slot: Arc<Slot<u32>> = Slot::new();
        let token = CancelToken::new();
        let remote = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.cancel();
        });
        assert!(matches!(
            slot.wait_cancellable(&token),
            Err(Error::Interrupted)
        ));
    }

    #[test]
    fn settled_slot_wins_over_fired_token() {
        let slot: Arc<Slot<u32>> = Slot::new();
        slot.publish(9);
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(slot.wait_cancellable(&token).expect("already settled"), 9);
    }

    #[test]
    fn many_waiters_see_the_same_value() {
        let slot: Arc<Slot<u32>> = Slot::new();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let s = slot.clone();
            handles.push(thread::spawn(move || s.wait().expect("slot settled")));
        }
        thread::sleep(Duration::from_millis(30));
        slot.publish(42);
        for h in handles {
            assert_eq!(h.join().expect("waiter thread"), 42);
        }
    }
}
