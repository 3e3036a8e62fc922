//! `SwitchLock`: a fair, timeout-capable, cancellable exclusive lock.
//!
//! # State
//!
//! ```text
//! holder       Option<TrainNumber>   current owner, if any
//! queue        VecDeque<ticket>      waiters in arrival order
//! next_ticket  u64                   monotonically increasing
//! ```
//!
//! A waiter is granted the switch only when `holder` is empty **and** its
//! ticket is at the head of `queue`.  Release clears `holder` and broadcasts;
//! every waiter re-checks, and only the head proceeds.  Tickets that time out
//! or are cancelled are removed wherever they sit in the queue.
//!
//! Ownership is handed out as a [`SwitchGuard`]; the only way to release a
//! switch is to drop (or [`release`](SwitchGuard::release)) that guard, so a
//! train can never release a switch it does not hold.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use yard_core::{CancelToken, SwitchId, TrainNumber, Wake};

// ── SwitchState ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct SwitchState {
    holder:      Option<TrainNumber>,
    queue:       VecDeque<u64>,
    next_ticket: u64,
}

impl SwitchState {
    fn take_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.queue.push_back(ticket);
        ticket
    }

    #[inline]
    fn is_turn(&self, ticket: u64) -> bool {
        self.holder.is_none() && self.queue.front() == Some(&ticket)
    }

    /// Drop `ticket` from the queue.  Returns `true` if waiters must be
    /// re-checked (the head changed while the switch is free).
    fn leave(&mut self, ticket: u64) -> bool {
        let was_head = self.queue.front() == Some(&ticket);
        if let Some(pos) = self.queue.iter().position(|&t| t == ticket) {
            self.queue.remove(pos);
        }
        was_head && self.holder.is_none() && !self.queue.is_empty()
    }
}

// ── Acquisition ───────────────────────────────────────────────────────────────

/// Outcome of one [`SwitchLock::try_acquire`] call.
#[must_use]
pub enum Acquisition<'a> {
    /// The caller now holds the switch.
    Acquired(SwitchGuard<'a>),
    /// The timeout elapsed first; the caller holds nothing.
    TimedOut,
    /// The run was cancelled while waiting; the caller holds nothing.
    Cancelled,
}

impl<'a> Acquisition<'a> {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Acquisition::Acquired(_))
    }

    pub fn into_guard(self) -> Option<SwitchGuard<'a>> {
        match self {
            Acquisition::Acquired(guard) => Some(guard),
            Acquisition::TimedOut | Acquisition::Cancelled => None,
        }
    }
}

impl fmt::Debug for Acquisition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acquisition::Acquired(guard) => f.debug_tuple("Acquired").field(guard).finish(),
            Acquisition::TimedOut => f.write_str("TimedOut"),
            Acquisition::Cancelled => f.write_str("Cancelled"),
        }
    }
}

// ── SwitchLock ────────────────────────────────────────────────────────────────

/// One physical switch.  Shared between routes via `Arc<SwitchLock>`.
pub struct SwitchLock {
    id:    SwitchId,
    state: Mutex<SwitchState>,
    turn:  Condvar,
}

impl SwitchLock {
    pub fn new(id: SwitchId) -> Self {
        Self {
            id,
            state: Mutex::new(SwitchState::default()),
            turn:  Condvar::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> SwitchId {
        self.id
    }

    /// Wait up to `timeout` for exclusive ownership on behalf of `owner`.
    ///
    /// Waiters are served strictly in arrival order.  Returns
    /// [`Acquisition::Cancelled`] promptly once `cancel` fires, provided this
    /// lock has been registered with the token (see [`Wake`]).
    ///
    /// Not reentrant: `owner` must not already hold this switch.
    pub fn try_acquire(
        &self,
        owner:   TrainNumber,
        timeout: Duration,
        cancel:  &CancelToken,
    ) -> Acquisition<'_> {
        // `None` means the timeout is too large to represent; wait unbounded.
        let deadline = Instant::now().checked_add(timeout);

        let mut state = self.state();
        debug_assert_ne!(
            state.holder,
            Some(owner),
            "train {owner} re-acquired switch {} it already holds",
            self.id
        );
        let ticket = state.take_ticket();

        loop {
            if cancel.is_cancelled() {
                if state.leave(ticket) {
                    self.turn.notify_all();
                }
                return Acquisition::Cancelled;
            }

            if state.is_turn(ticket) {
                state.queue.pop_front();
                state.holder = Some(owner);
                log::trace!("switch {}: granted to train {owner} (ticket {ticket})", self.id);
                return Acquisition::Acquired(SwitchGuard { lock: self, owner });
            }

            let now = Instant::now();
            state = match deadline {
                Some(d) if now >= d => {
                    if state.leave(ticket) {
                        self.turn.notify_all();
                    }
                    log::trace!("switch {}: train {owner} timed out (ticket {ticket})", self.id);
                    return Acquisition::TimedOut;
                }
                Some(d) => {
                    self.turn
                        .wait_timeout(state, d - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self.turn.wait(state).unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Current owner, if the switch is held.
    pub fn holder(&self) -> Option<TrainNumber> {
        self.state().holder
    }

    pub fn is_held(&self) -> bool {
        self.holder().is_some()
    }

    /// Number of callers currently queued in `try_acquire`.
    pub fn waiting(&self) -> usize {
        self.state().queue.len()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Every mutation of `SwitchState` is a single field update, so a
    /// poisoned mutex still guards consistent data.
    fn state(&self) -> MutexGuard<'_, SwitchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, owner: TrainNumber) {
        let mut state = self.state();
        if state.holder != Some(owner) {
            return;
        }
        state.holder = None;
        let contended = !state.queue.is_empty();
        drop(state);
        log::trace!("switch {}: released by train {owner}", self.id);
        if contended {
            self.turn.notify_all();
        }
    }
}

impl Wake for SwitchLock {
    fn wake(&self) {
        // Taking the state mutex orders this notify after any waiter's
        // cancellation check.
        let _state = self.state();
        self.turn.notify_all();
    }
}

impl fmt::Debug for SwitchLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("SwitchLock")
            .field("id", &self.id)
            .field("holder", &state.holder)
            .field("waiting", &state.queue.len())
            .finish()
    }
}

// ── SwitchGuard ───────────────────────────────────────────────────────────────

/// Exclusive hold on one switch.  Releases on drop.
#[must_use = "dropping the guard releases the switch immediately"]
pub struct SwitchGuard<'a> {
    lock:  &'a SwitchLock,
    owner: TrainNumber,
}

impl SwitchGuard<'_> {
    #[inline]
    pub fn switch_id(&self) -> SwitchId {
        self.lock.id
    }

    #[inline]
    pub fn owner(&self) -> TrainNumber {
        self.owner
    }

    /// Release the switch now.  Equivalent to dropping the guard.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for SwitchGuard<'_> {
    fn drop(&mut self) {
        self.lock.release(self.owner);
    }
}

impl fmt::Debug for SwitchGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchGuard")
            .field("switch", &self.lock.id)
            .field("owner", &self.owner)
            .finish()
    }
}
