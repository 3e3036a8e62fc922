//! Train status and protocol phase.

use std::fmt;

/// Where a train ended up.  Every agent reaches exactly one terminal status.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrainStatus {
    /// Not yet run.
    Pending,
    /// Held every switch on its route, moved, and released them.
    Dispatched,
    /// No route exists, or every attempt timed out.  See [`HoldReason`].
    PermanentHold,
    /// The run was cancelled (global deadline or operator) before the train
    /// finished.
    Incomplete,
}

impl TrainStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, TrainStatus::Pending)
    }

    /// Label used in the final report.
    pub fn label(self) -> &'static str {
        match self {
            TrainStatus::Pending       => "Pending",
            TrainStatus::Dispatched    => "Dispatched",
            TrainStatus::PermanentHold => "Permanent Hold",
            TrainStatus::Incomplete    => "Incomplete",
        }
    }
}

impl fmt::Display for TrainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a train is on permanent hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HoldReason {
    /// The yard has no route for the train's track pair.  No attempt is made.
    NoRoute,
    /// Every allowed attempt hit a busy switch.
    AttemptsExhausted,
}

impl HoldReason {
    pub fn label(self) -> &'static str {
        match self {
            HoldReason::NoRoute           => "no route",
            HoldReason::AttemptsExhausted => "attempts exhausted",
        }
    }
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position in the acquisition/retry state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AgentPhase {
    Idle,
    AcquiringSwitches,
    Moving,
    ReleasingLocks,
    RetryWait,
    Finished,
}
