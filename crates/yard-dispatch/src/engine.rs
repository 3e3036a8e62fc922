//! The `DispatchEngine` and its run loop.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;

use rayon::ThreadPoolBuilder;

use yard_agent::{AgentObserver, TrainAgent};
use yard_core::{CancelReason, CancelToken, DispatchConfig, TrainNumber, Wake};
use yard_topology::Topology;

use crate::{DispatchError, DispatchReport, DispatchResult, ReportRow};

/// Runs a fleet of [`TrainAgent`]s against a shared yard.
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].  `run` consumes the
/// engine; a yard is dispatched once.
pub struct DispatchEngine {
    pub(crate) config:   DispatchConfig,
    pub(crate) topology: Arc<Topology>,
    pub(crate) agents:   Vec<TrainAgent>,
    pub(crate) cancel:   CancelToken,
}

impl DispatchEngine {
    /// Handle for cancelling the run from another thread.
    ///
    /// `cancel(CancelReason::Operator)` makes [`run`](Self::run) return
    /// [`DispatchError::Cancelled`] once every agent has released its
    /// switches.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Dispatch every train and block until all of them are terminal or the
    /// global deadline forces the rest to `Incomplete`.
    ///
    /// `observer` receives every agent's events from whichever worker thread
    /// runs it.
    pub fn run<O>(self, observer: Arc<O>) -> DispatchResult<DispatchReport>
    where
        O: AgentObserver + ?Sized + 'static,
    {
        let start = Instant::now();
        let deadline = start + self.config.global_deadline();
        let DispatchEngine { config, topology, agents, cancel } = self;

        // Blocked waiters must see a cancel without waiting out their timeout.
        for switch in topology.switches() {
            cancel.register(Arc::clone(switch) as Arc<dyn Wake>);
        }

        // Every train starts out Incomplete; a row is replaced when its agent
        // reports back.
        let mut rows: BTreeMap<TrainNumber, ReportRow> = agents
            .iter()
            .map(|a| (a.train(), ReportRow::lost(a.train(), a.inbound(), a.outbound())))
            .collect();

        let (routable, unroutable): (Vec<_>, Vec<_>) =
            agents.into_iter().partition(TrainAgent::is_dispatchable);

        for mut agent in unroutable {
            agent.run(&config, &cancel, &*observer);
            rows.insert(agent.train(), ReportRow::from_agent(&agent));
        }

        let mut deadline_expired = false;
        if !routable.is_empty() {
            let threads = config.max_concurrency.min(routable.len()).max(1);
            log::info!(
                "dispatching {} trains on {threads} workers ({} without a route)",
                routable.len(),
                rows.len() - routable.len()
            );

            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("yard-worker-{i}"))
                .panic_handler(|payload| {
                    log::error!("train agent panicked: {}", panic_message(payload.as_ref()));
                })
                .build()?;

            let config = Arc::new(config);
            let (tx, rx) = mpsc::channel::<TrainAgent>();
            for mut agent in routable {
                let tx = tx.clone();
                let config = Arc::clone(&config);
                let cancel = cancel.clone();
                let observer = Arc::clone(&observer);
                pool.spawn(move || {
                    agent.run(&config, &cancel, &*observer);
                    // The receiver outlives every task.
                    let _ = tx.send(agent);
                });
            }
            drop(tx);

            let mut draining = false;
            loop {
                let received = if draining {
                    rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
                } else {
                    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                };
                match received {
                    Ok(agent) => {
                        rows.insert(agent.train(), ReportRow::from_agent(&agent));
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        deadline_expired = cancel.cancel(CancelReason::Deadline);
                        if deadline_expired {
                            log::warn!(
                                "global deadline of {} ms reached; cancelling unfinished trains",
                                config.global_deadline_ms
                            );
                        }
                        draining = true;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        }

        let report = DispatchReport::new(rows.into_values().collect(), start.elapsed(), deadline_expired);
        let summary = report.summary();
        log::info!(
            "dispatch finished in {:.3}s: {} dispatched, {} on hold, {} incomplete",
            report.elapsed.as_secs_f64(),
            summary.dispatched,
            summary.permanent_hold,
            summary.incomplete
        );
        debug_assert!(topology.held_switches().is_empty(), "switch still held after run");

        if cancel.reason() == Some(CancelReason::Operator) {
            return Err(DispatchError::Cancelled);
        }
        Ok(report)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}
