//! Agent observer trait for tracing acquisition, release and retry events.

use std::time::Duration;

use yard_core::{SwitchId, TrainNumber};

use crate::TrainStatus;

/// Callbacks invoked by [`TrainAgent::run`][crate::TrainAgent::run] at each
/// step of the protocol.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  One observer is shared by every worker
/// thread, hence `Send + Sync`.
///
/// `on_releasing` fires *before* the switch is given up, and `on_acquired`
/// *after* it is granted.  An observer that records events under a single
/// mutex therefore sees, for every switch, a strictly alternating
/// acquired/releasing sequence.
pub trait AgentObserver: Send + Sync {
    /// `train` now holds `switch`.
    fn on_acquired(&self, _train: TrainNumber, _switch: SwitchId) {}

    /// `train` holds every switch on its route and is about to move.
    fn on_all_acquired(&self, _train: TrainNumber) {}

    /// `train` timed out waiting for `switch`; the attempt is abandoned.
    fn on_blocked(&self, _train: TrainNumber, _switch: SwitchId) {}

    /// `train` is about to release `switch`.
    fn on_releasing(&self, _train: TrainNumber, _switch: SwitchId) {}

    /// Attempt number `attempt` failed; the train waits `backoff` first.
    fn on_retry(&self, _train: TrainNumber, _attempt: u32, _backoff: Duration) {}

    /// `train` reached a terminal status after `attempts` attempts.
    fn on_finished(&self, _train: TrainNumber, _status: TrainStatus, _attempts: u32) {}
}

/// An [`AgentObserver`] that does nothing.
pub struct NoopObserver;

impl AgentObserver for NoopObserver {}

/// Writes the yard's trace lines through the `log` facade.
///
/// Lock and dispatch events are logged at `info`, releases and retries at
/// `debug`, holds and incomplete runs at `warn`.
pub struct LogObserver;

impl AgentObserver for LogObserver {
    fn on_acquired(&self, train: TrainNumber, switch: SwitchId) {
        log::info!("Train #{train}: HOLDS LOCK on Switch {switch}");
    }

    fn on_all_acquired(&self, train: TrainNumber) {
        log::info!("Train #{train}: HOLDS ALL NEEDED SWITCH LOCKS");
    }

    fn on_blocked(&self, train: TrainNumber, switch: SwitchId) {
        log::info!("Train #{train}: UNABLE TO LOCK Switch {switch}");
    }

    fn on_releasing(&self, train: TrainNumber, switch: SwitchId) {
        log::debug!("Train #{train}: releasing Switch {switch}");
    }

    fn on_retry(&self, train: TrainNumber, attempt: u32, backoff: Duration) {
        log::debug!(
            "Train #{train}: attempt {attempt} failed, retrying in {} ms",
            backoff.as_millis()
        );
    }

    fn on_finished(&self, train: TrainNumber, status: TrainStatus, attempts: u32) {
        match status {
            TrainStatus::Dispatched => log::info!("Train #{train}: Has been dispatched"),
            TrainStatus::PermanentHold => log::warn!(
                "Train #{train} is on permanent hold and cannot be dispatched ({attempts} attempts)"
            ),
            TrainStatus::Incomplete => log::warn!("Train #{train}: incomplete, run was cancelled"),
            TrainStatus::Pending => {}
        }
    }
}
