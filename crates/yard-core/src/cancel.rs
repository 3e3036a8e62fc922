//! One-shot cancellation signal shared by the dispatch engine and its agents.
//!
//! # Wake-up protocol
//!
//! A cancelled token must interrupt two kinds of blocked agent:
//!
//! - agents sleeping (movement, retry backoff) park on the token's own
//!   condvar via [`CancelToken::sleep`];
//! - agents queued inside a switch lock park on the *switch's*
//!   condvar, which the token cannot see.  Such resources implement [`Wake`]
//!   and are [`register`](CancelToken::register)ed with the token.
//!
//! `cancel` flips the state, then calls `wake` on every registered
//! resource.  A resource's `wake` must take the same mutex its waiters
//! check the token under; a waiter that saw "not cancelled" is therefore
//! already parked when the notification arrives.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A blocking resource that can be told to re-check cancellation.
pub trait Wake: Send + Sync {
    /// Wake every thread parked on this resource.
    fn wake(&self);
}

/// Why a token was cancelled.  The first `cancel` call wins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The engine's global deadline expired.
    Deadline,
    /// Someone outside the engine asked the run to stop.
    Operator,
}

const LIVE: u8 = 0;
const DEADLINE: u8 = 1;
const OPERATOR: u8 = 2;

impl CancelReason {
    fn code(self) -> u8 {
        match self {
            CancelReason::Deadline => DEADLINE,
            CancelReason::Operator => OPERATOR,
        }
    }
}

#[derive(Default)]
struct Inner {
    state:    AtomicU8,
    gate:     Mutex<()>,
    sleepers: Condvar,
    wakers:   Mutex<Vec<Arc<dyn Wake>>>,
}

/// Cloneable handle to a shared cancellation flag.
///
/// All clones observe the same state.  A token cannot be reset; build a new
/// one per run.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token.  Returns `false` if it was already cancelled, in
    /// which case the original reason is kept and nobody is re-woken.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        let won = {
            let _gate = self.inner.gate.lock().unwrap_or_else(PoisonError::into_inner);
            self.inner
                .state
                .compare_exchange(LIVE, reason.code(), Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        };
        if !won {
            return false;
        }
        self.inner.sleepers.notify_all();

        let wakers: Vec<Arc<dyn Wake>> = self
            .inner
            .wakers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for waker in wakers {
            waker.wake();
        }
        true
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.state.load(Ordering::SeqCst) != LIVE
    }

    /// The reason given to the winning `cancel` call, if any.
    pub fn reason(&self) -> Option<CancelReason> {
        match self.inner.state.load(Ordering::SeqCst) {
            DEADLINE => Some(CancelReason::Deadline),
            OPERATOR => Some(CancelReason::Operator),
            _ => None,
        }
    }

    /// Register a resource to be woken on cancellation.
    ///
    /// Registering on an already-cancelled token wakes the resource at once.
    pub fn register(&self, waker: Arc<dyn Wake>) {
        self.inner
            .wakers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&waker));
        if self.is_cancelled() {
            waker.wake();
        }
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` if the full duration elapsed, `false` if the token was
    /// (or already had been) cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut gate = self.inner.gate.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let (next, _) = self
                .inner
                .sleepers
                .wait_timeout(gate, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            gate = next;
        }
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("reason", &self.reason())
            .finish()
    }
}
