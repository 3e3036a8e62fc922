//! Final per-train outcome table.

use std::collections::BTreeSet;
use std::time::Duration;

use yard_agent::{HoldReason, TrainAgent, TrainStatus};
use yard_core::{TrackId, TrainNumber};

/// One line of the final report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub train:       TrainNumber,
    pub inbound:     TrackId,
    pub outbound:    TrackId,
    pub status:      TrainStatus,
    pub hold_reason: Option<HoldReason>,
    pub attempts:    u32,
}

impl ReportRow {
    pub fn from_agent(agent: &TrainAgent) -> Self {
        Self {
            train:       agent.train(),
            inbound:     agent.inbound(),
            outbound:    agent.outbound(),
            status:      agent.status(),
            hold_reason: agent.hold_reason(),
            attempts:    agent.attempts(),
        }
    }

    /// Row for an agent that never reported back (its task panicked).
    pub(crate) fn lost(train: TrainNumber, inbound: TrackId, outbound: TrackId) -> Self {
        Self {
            train,
            inbound,
            outbound,
            status:      TrainStatus::Incomplete,
            hold_reason: None,
            attempts:    0,
        }
    }
}

/// Count of trains per terminal status.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub dispatched:     usize,
    pub permanent_hold: usize,
    pub incomplete:     usize,
}

/// Outcome of a [`DispatchEngine::run`][crate::DispatchEngine::run].
#[derive(Clone, Debug)]
pub struct DispatchReport {
    /// One row per train, ascending train number.
    pub rows: Vec<ReportRow>,

    /// Wall-clock time from start of run to the last agent reporting back.
    pub elapsed: Duration,

    /// `true` if the global deadline fired before every train finished.
    pub deadline_expired: bool,
}

impl DispatchReport {
    pub(crate) fn new(mut rows: Vec<ReportRow>, elapsed: Duration, deadline_expired: bool) -> Self {
        rows.sort_by_key(|r| r.train);
        Self { rows, elapsed, deadline_expired }
    }

    pub fn status_of(&self, train: TrainNumber) -> Option<TrainStatus> {
        self.rows
            .binary_search_by_key(&train, |r| r.train)
            .ok()
            .map(|i| self.rows[i].status)
    }

    pub fn dispatched(&self) -> BTreeSet<TrainNumber> {
        self.with_status(TrainStatus::Dispatched)
    }

    pub fn permanent_hold(&self) -> BTreeSet<TrainNumber> {
        self.with_status(TrainStatus::PermanentHold)
    }

    pub fn incomplete(&self) -> BTreeSet<TrainNumber> {
        self.with_status(TrainStatus::Incomplete)
    }

    pub fn summary(&self) -> StatusSummary {
        let mut s = StatusSummary::default();
        for row in &self.rows {
            match row.status {
                TrainStatus::Dispatched    => s.dispatched += 1,
                TrainStatus::PermanentHold => s.permanent_hold += 1,
                TrainStatus::Incomplete | TrainStatus::Pending => s.incomplete += 1,
            }
        }
        s
    }

    fn with_status(&self, status: TrainStatus) -> BTreeSet<TrainNumber> {
        self.rows.iter().filter(|r| r.status == status).map(|r| r.train).collect()
    }
}
