//! `TrainAgent`: the per-train acquisition, movement and retry loop.

use std::sync::Arc;

use yard_core::{CancelToken, DispatchConfig, SwitchId, TrackId, TrainNumber, TrainRng};
use yard_switch::{Acquisition, SwitchGuard};
use yard_topology::{FleetEntry, Route, Topology};

use crate::{AgentObserver, AgentPhase, HoldReason, TrainStatus};

/// Result of one pass over the route.
enum AttemptOutcome {
    Dispatched,
    Blocked(SwitchId),
    Cancelled,
}

/// One train from the fleet schedule, bound to its route (if the yard has
/// one).
///
/// An agent is moved onto a worker thread, [`run`](Self::run) to a terminal
/// status there, and handed back to the engine for reporting.  Nothing else
/// mutates it in between.
#[derive(Debug)]
pub struct TrainAgent {
    train:       TrainNumber,
    inbound:     TrackId,
    outbound:    TrackId,
    route:       Option<Arc<Route>>,
    attempts:    u32,
    status:      TrainStatus,
    hold_reason: Option<HoldReason>,
    phase:       AgentPhase,
    rng:         TrainRng,
}

impl TrainAgent {
    pub fn new(
        train:    TrainNumber,
        inbound:  TrackId,
        outbound: TrackId,
        route:    Option<Arc<Route>>,
        rng:      TrainRng,
    ) -> Self {
        Self {
            train,
            inbound,
            outbound,
            route,
            attempts:    0,
            status:      TrainStatus::Pending,
            hold_reason: None,
            phase:       AgentPhase::Idle,
            rng,
        }
    }

    /// Build an agent for a fleet row, resolving its route in `topology`.
    pub fn from_fleet(entry: &FleetEntry, topology: &Topology, seed: u64) -> Self {
        Self::new(
            entry.train,
            entry.inbound,
            entry.outbound,
            topology.resolve_route(entry.inbound, entry.outbound),
            TrainRng::new(seed, entry.train),
        )
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn train(&self) -> TrainNumber {
        self.train
    }

    #[inline]
    pub fn inbound(&self) -> TrackId {
        self.inbound
    }

    #[inline]
    pub fn outbound(&self) -> TrackId {
        self.outbound
    }

    pub fn route(&self) -> Option<&Arc<Route>> {
        self.route.as_ref()
    }

    /// `false` if the yard has no route for this train.
    pub fn is_dispatchable(&self) -> bool {
        self.route.is_some()
    }

    /// Acquisition attempts made so far (0 for a train with no route).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn status(&self) -> TrainStatus {
        self.status
    }

    /// Set only when `status` is `PermanentHold`.
    pub fn hold_reason(&self) -> Option<HoldReason> {
        self.hold_reason
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    // ── Protocol ──────────────────────────────────────────────────────────

    /// Drive the agent to a terminal status and return it.
    ///
    /// - No route: `PermanentHold` immediately, zero attempts.
    /// - Otherwise up to `config.max_attempts` passes over the route, with a
    ///   random backoff in `[backoff_min, backoff_max]` between passes.
    /// - `cancel` firing at any point releases held switches in reverse
    ///   order and ends in `Incomplete`.
    ///
    /// On return the agent holds no switches.  Calling `run` again on a
    /// finished agent is a no-op that returns the same status.
    pub fn run<O>(&mut self, config: &DispatchConfig, cancel: &CancelToken, observer: &O) -> TrainStatus
    where
        O: AgentObserver + ?Sized,
    {
        if self.status.is_terminal() {
            return self.status;
        }
        let Some(route) = self.route.clone() else {
            return self.finish(TrainStatus::PermanentHold, Some(HoldReason::NoRoute), observer);
        };

        loop {
            if cancel.is_cancelled() {
                return self.finish(TrainStatus::Incomplete, None, observer);
            }

            self.attempts += 1;
            match self.attempt(&route, config, cancel, observer) {
                AttemptOutcome::Dispatched => {
                    return self.finish(TrainStatus::Dispatched, None, observer);
                }
                AttemptOutcome::Cancelled => {
                    return self.finish(TrainStatus::Incomplete, None, observer);
                }
                AttemptOutcome::Blocked(switch) => {
                    log::trace!(
                        "train {}: attempt {} blocked at switch {switch}",
                        self.train, self.attempts
                    );
                    if self.attempts >= config.max_attempts {
                        return self.finish(
                            TrainStatus::PermanentHold,
                            Some(HoldReason::AttemptsExhausted),
                            observer,
                        );
                    }

                    let backoff = self.rng.backoff(config.backoff_min(), config.backoff_max());
                    observer.on_retry(self.train, self.attempts, backoff);
                    self.phase = AgentPhase::RetryWait;
                    if !cancel.sleep(backoff) {
                        return self.finish(TrainStatus::Incomplete, None, observer);
                    }
                }
            }
        }
    }

    /// One pass over the route.  Holds nothing on return.
    fn attempt<O>(
        &mut self,
        route:    &Route,
        config:   &DispatchConfig,
        cancel:   &CancelToken,
        observer: &O,
    ) -> AttemptOutcome
    where
        O: AgentObserver + ?Sized,
    {
        self.phase = AgentPhase::AcquiringSwitches;
        let mut held: Vec<SwitchGuard<'_>> = Vec::with_capacity(route.len());

        for switch in route.switches() {
            match switch.try_acquire(self.train, config.switch_timeout(), cancel) {
                Acquisition::Acquired(guard) => {
                    observer.on_acquired(self.train, switch.id());
                    held.push(guard);
                }
                Acquisition::TimedOut => {
                    observer.on_blocked(self.train, switch.id());
                    self.release_all(&mut held, observer);
                    return AttemptOutcome::Blocked(switch.id());
                }
                Acquisition::Cancelled => {
                    self.release_all(&mut held, observer);
                    return AttemptOutcome::Cancelled;
                }
            }
        }

        observer.on_all_acquired(self.train);
        self.phase = AgentPhase::Moving;
        let arrived = cancel.sleep(config.movement());
        self.release_all(&mut held, observer);

        if arrived { AttemptOutcome::Dispatched } else { AttemptOutcome::Cancelled }
    }

    /// Release every held switch, most recently acquired first.
    fn release_all<O>(&mut self, held: &mut Vec<SwitchGuard<'_>>, observer: &O)
    where
        O: AgentObserver + ?Sized,
    {
        self.phase = AgentPhase::ReleasingLocks;
        while let Some(guard) = held.pop() {
            observer.on_releasing(self.train, guard.switch_id());
            guard.release();
        }
    }

    fn finish<O>(&mut self, status: TrainStatus, reason: Option<HoldReason>, observer: &O) -> TrainStatus
    where
        O: AgentObserver + ?Sized,
    {
        self.status = status;
        self.hold_reason = reason;
        self.phase = AgentPhase::Finished;
        observer.on_finished(self.train, status, self.attempts);
        status
    }
}

/// Build one agent per fleet row, in file order.
pub fn agents_from_fleet(fleet: &[FleetEntry], topology: &Topology, seed: u64) -> Vec<TrainAgent> {
    fleet
        .iter()
        .map(|entry| TrainAgent::from_fleet(entry, topology, seed))
        .collect()
}
