//! Topology-subsystem error type.

use thiserror::Error;

use yard_core::{SwitchId, TrackId, TrainNumber};

/// Errors produced while loading or validating yard data.  All of them are
/// fatal: no partial topology is ever returned.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("record {record}: {message}")]
    Parse { record: u64, message: String },

    #[error("route {inbound} -> {outbound} lists no switches")]
    EmptyRoute { inbound: TrackId, outbound: TrackId },

    #[error("route {inbound} -> {outbound} lists switch {switch} more than once")]
    RepeatedSwitch {
        inbound:  TrackId,
        outbound: TrackId,
        switch:   SwitchId,
    },

    #[error("route {inbound} -> {outbound} is defined more than once")]
    DuplicateRoute { inbound: TrackId, outbound: TrackId },

    #[error("train {0} appears more than once in the fleet schedule")]
    DuplicateTrain(TrainNumber),

    #[error("routes lock switches in conflicting order: {}", format_cycle(.0))]
    OrderingCycle(Vec<SwitchId>),
}

pub type TopologyResult<T> = Result<T, TopologyError>;

/// `[101, 102]` → `"101 -> 102 -> 101"`.
pub(crate) fn format_cycle(cycle: &[SwitchId]) -> String {
    let mut out: Vec<String> = cycle.iter().map(ToString::to_string).collect();
    if let Some(first) = cycle.first() {
        out.push(first.to_string());
    }
    out.join(" -> ")
}
