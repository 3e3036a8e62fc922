//! Integration tests for yard-dispatch.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use yard_agent::{AgentObserver, HoldReason, NoopObserver, TrainAgent, TrainStatus, agents_from_fleet};
use yard_core::{CancelReason, DispatchConfig, SwitchId, TrackId, TrainNumber};
use yard_topology::{FleetEntry, Topology, TopologyBuilder};

use crate::{DispatchError, DispatchReport, EngineBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fast_config() -> DispatchConfig {
    DispatchConfig {
        switch_timeout_ms:  50,
        max_attempts:       10,
        backoff_min_ms:     20,
        backoff_max_ms:     60,
        movement_ms:        200,
        max_concurrency:    30,
        global_deadline_ms: 30_000,
        seed:               7,
    }
}

fn yard(routes: &[(u32, &[u32], u32)]) -> Arc<Topology> {
    let mut b = TopologyBuilder::new();
    for &(inbound, switches, outbound) in routes {
        let ids: Vec<SwitchId> = switches.iter().copied().map(SwitchId).collect();
        b.add_route(TrackId(inbound), &ids, TrackId(outbound));
    }
    Arc::new(b.build().unwrap())
}

/// The sample yard: two routes sharing switch 102.
fn sample_yard() -> Arc<Topology> {
    yard(&[(1, &[101, 102, 103], 9), (2, &[104, 102, 105], 9)])
}

fn fleet(rows: &[(u32, u32, u32)]) -> Vec<FleetEntry> {
    rows.iter()
        .map(|&(t, i, o)| FleetEntry { train: TrainNumber(t), inbound: TrackId(i), outbound: TrackId(o) })
        .collect()
}

fn dispatch(config: DispatchConfig, topology: &Arc<Topology>, entries: &[FleetEntry]) -> DispatchReport {
    let agents = agents_from_fleet(entries, topology, config.seed);
    EngineBuilder::new(config, Arc::clone(topology))
        .agents(agents)
        .build()
        .unwrap()
        .run(Arc::new(NoopObserver))
        .unwrap()
}

fn attempts_of(report: &DispatchReport, train: u32) -> u32 {
    report.rows.iter().find(|r| r.train == TrainNumber(train)).unwrap().attempts
}

/// Records every acquire/release against the switch it concerns.
#[derive(Default)]
struct Timeline {
    per_switch: Mutex<BTreeMap<SwitchId, Vec<(bool, TrainNumber)>>>,
}

impl AgentObserver for Timeline {
    fn on_acquired(&self, train: TrainNumber, switch: SwitchId) {
        self.per_switch.lock().unwrap().entry(switch).or_default().push((true, train));
    }
    fn on_releasing(&self, train: TrainNumber, switch: SwitchId) {
        self.per_switch.lock().unwrap().entry(switch).or_default().push((false, train));
    }
}

// ── EngineBuilder validation ──────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn invalid_config_rejected() {
        let config = DispatchConfig { max_attempts: 0, ..fast_config() };
        let err = EngineBuilder::new(config, sample_yard()).build().err().unwrap();
        assert!(matches!(err, DispatchError::Config(_)));
    }

    #[test]
    fn duplicate_train_rejected() {
        let topology = sample_yard();
        let mut agents = agents_from_fleet(&fleet(&[(4, 1, 9)]), &topology, 1);
        agents.extend(agents_from_fleet(&fleet(&[(4, 2, 9)]), &topology, 1));
        let err = EngineBuilder::new(fast_config(), topology).agents(agents).build().err().unwrap();
        assert!(matches!(err, DispatchError::DuplicateTrain(TrainNumber(4))));
    }

    #[test]
    fn empty_fleet_yields_empty_report() {
        let report = dispatch(fast_config(), &sample_yard(), &[]);
        assert!(report.rows.is_empty());
        assert!(!report.deadline_expired);
    }
}

// ── Dispatch scenarios ────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn shared_switch_both_trains_dispatch() {
        let topology = sample_yard();
        let report = dispatch(fast_config(), &topology, &fleet(&[(1, 1, 9), (2, 2, 9)]));

        assert_eq!(report.status_of(TrainNumber(1)), Some(TrainStatus::Dispatched));
        assert_eq!(report.status_of(TrainNumber(2)), Some(TrainStatus::Dispatched));
        assert!(!report.deadline_expired);
        assert!(topology.held_switches().is_empty());

        // Movement (200 ms) outlasts the switch timeout (50 ms), so at most
        // one train gets through on its first attempt.
        let mut attempts = [attempts_of(&report, 1), attempts_of(&report, 2)];
        attempts.sort_unstable();
        assert!(attempts[1] >= 2, "attempts {attempts:?}");
    }

    #[test]
    fn unroutable_train_held_others_dispatch() {
        let topology = sample_yard();
        let report = dispatch(fast_config(), &topology, &fleet(&[(1, 1, 9), (3, 5, 50)]));

        assert_eq!(report.status_of(TrainNumber(1)), Some(TrainStatus::Dispatched));
        let held = report.rows.iter().find(|r| r.train == TrainNumber(3)).unwrap();
        assert_eq!(held.status, TrainStatus::PermanentHold);
        assert_eq!(held.hold_reason, Some(HoldReason::NoRoute));
        assert_eq!(held.attempts, 0);
    }

    #[test]
    fn disjoint_routes_dispatch_first_try() {
        let topology = yard(&[(1, &[1, 2, 3], 9), (2, &[4, 5, 6], 9), (3, &[7, 8, 9], 9), (4, &[10, 11, 12], 9)]);
        let config = DispatchConfig { movement_ms: 20, ..fast_config() };
        let report = dispatch(config, &topology, &fleet(&[(1, 1, 9), (2, 2, 9), (3, 3, 9), (4, 4, 9)]));

        assert_eq!(report.dispatched().len(), 4);
        assert!(report.rows.iter().all(|r| r.attempts == 1));
    }

    #[test]
    fn single_worker_serialises_trains() {
        let topology = sample_yard();
        let config = DispatchConfig { max_concurrency: 1, movement_ms: 20, ..fast_config() };
        let report = dispatch(config, &topology, &fleet(&[(1, 1, 9), (2, 2, 9)]));

        // One at a time: nobody ever finds 102 busy.
        assert_eq!(report.dispatched().len(), 2);
        assert_eq!(attempts_of(&report, 1), 1);
        assert_eq!(attempts_of(&report, 2), 1);
    }

    #[test]
    fn report_sorted_by_train_number() {
        let topology = sample_yard();
        let config = DispatchConfig { movement_ms: 10, ..fast_config() };
        let report = dispatch(config, &topology, &fleet(&[(9, 5, 50), (2, 2, 9), (5, 1, 9)]));

        let order: Vec<u32> = report.rows.iter().map(|r| r.train.get()).collect();
        assert_eq!(order, vec![2, 5, 9]);
        let s = report.summary();
        assert_eq!(s.dispatched + s.permanent_hold + s.incomplete, 3);
        assert_eq!(s.permanent_hold, 1);
    }

    #[test]
    fn switches_never_double_held() {
        let topology = sample_yard();
        let config = DispatchConfig { movement_ms: 30, switch_timeout_ms: 40, ..fast_config() };
        let trains: Vec<(u32, u32, u32)> = (1..=8).map(|t| (t, if t % 2 == 0 { 2 } else { 1 }, 9)).collect();
        let timeline = Arc::new(Timeline::default());

        let agents = agents_from_fleet(&fleet(&trains), &topology, config.seed);
        EngineBuilder::new(config, Arc::clone(&topology))
            .agents(agents)
            .build()
            .unwrap()
            .run(Arc::clone(&timeline))
            .unwrap();

        for (switch, events) in timeline.per_switch.lock().unwrap().iter() {
            for pair in events.chunks(2) {
                assert!(pair[0].0, "switch {switch}: release before acquire");
                assert_eq!(pair.len(), 2, "switch {switch}: never released");
                assert!(!pair[1].0, "switch {switch}: acquired twice");
                assert_eq!(pair[0].1, pair[1].1, "switch {switch}: released by non-holder");
            }
        }
    }
}

// ── Deadline and cancellation ─────────────────────────────────────────────────

#[cfg(test)]
mod termination {
    use super::*;

    #[test]
    fn deadline_marks_unfinished_trains_incomplete() {
        let topology = sample_yard();
        let config = DispatchConfig {
            movement_ms:        10_000,
            switch_timeout_ms:  10_000,
            global_deadline_ms: 200,
            ..fast_config()
        };

        let t0 = Instant::now();
        let report = dispatch(config, &topology, &fleet(&[(1, 1, 9), (2, 2, 9), (3, 5, 50)]));

        assert!(t0.elapsed() < Duration::from_secs(5));
        assert!(report.deadline_expired);
        assert_eq!(report.incomplete().len(), 2);
        assert_eq!(report.status_of(TrainNumber(3)), Some(TrainStatus::PermanentHold));
        assert!(topology.held_switches().is_empty());
    }

    #[test]
    fn operator_cancel_returns_error() {
        let topology = sample_yard();
        let config = DispatchConfig { movement_ms: 10_000, ..fast_config() };
        let agents = agents_from_fleet(&fleet(&[(1, 1, 9), (2, 2, 9)]), &topology, config.seed);
        let engine = EngineBuilder::new(config, Arc::clone(&topology)).agents(agents).build().unwrap();
        let cancel = engine.cancel_token();

        let t0 = Instant::now();
        let operator = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            cancel.cancel(CancelReason::Operator);
        });
        let result = engine.run(Arc::new(NoopObserver));
        operator.join().unwrap();

        assert!(matches!(result, Err(DispatchError::Cancelled)));
        assert!(t0.elapsed() < Duration::from_secs(5));
        assert!(topology.held_switches().is_empty());
    }

    #[test]
    fn panicking_agent_reported_incomplete() {
        struct PanicOn(TrainNumber);
        impl AgentObserver for PanicOn {
            fn on_all_acquired(&self, train: TrainNumber) {
                if train == self.0 {
                    panic!("observer failure for train {train}");
                }
            }
        }

        let topology = yard(&[(1, &[1, 2], 9), (2, &[3, 4], 9)]);
        let config = DispatchConfig { movement_ms: 10, ..fast_config() };
        let agents: Vec<TrainAgent> = agents_from_fleet(&fleet(&[(1, 1, 9), (2, 2, 9)]), &topology, 1);
        let report = EngineBuilder::new(config, Arc::clone(&topology))
            .agents(agents)
            .build()
            .unwrap()
            .run(Arc::new(PanicOn(TrainNumber(2))))
            .unwrap();

        assert_eq!(report.status_of(TrainNumber(1)), Some(TrainStatus::Dispatched));
        assert_eq!(report.status_of(TrainNumber(2)), Some(TrainStatus::Incomplete));
        assert!(topology.held_switches().is_empty());
    }
}
