//! Dispatch timing and capacity configuration.
//!
//! # Two timeout layers
//!
//! ```text
//! switch_timeout     bounds one SwitchLock::try_acquire call; expiry is
//!                    ordinary retry flow
//! global_deadline    bounds the whole run; expiry cancels every agent that
//!                    is still working and marks it Incomplete
//! ```
//!
//! All durations are stored as integer milliseconds so the struct reads and
//! writes cleanly as JSON.  Use the `Duration` accessors in code.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{YardError, YardResult};

/// Top-level dispatch configuration.
///
/// Typically loaded from a JSON file by the application crate (missing
/// fields fall back to [`Default`]) and handed to the dispatch engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// How long one `try_acquire` waits for a busy switch.  Default: 1000.
    pub switch_timeout_ms: u64,

    /// Acquisition attempts before a train goes to permanent hold.  Default: 3.
    pub max_attempts: u32,

    /// Lower bound of the randomised retry backoff.  Default: 1000.
    pub backoff_min_ms: u64,

    /// Upper bound (inclusive) of the randomised retry backoff.  Default: 3000.
    pub backoff_max_ms: u64,

    /// Simulated transit time while a train holds all of its switches.
    /// Default: 1000.
    pub movement_ms: u64,

    /// Worker pool size; excess trains queue for a free worker.  Default: 30.
    pub max_concurrency: usize,

    /// Wall-clock budget for the whole run.  Default: 300 000 (5 minutes).
    pub global_deadline_ms: u64,

    /// Master RNG seed for backoff jitter.
    pub seed: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            switch_timeout_ms:  1_000,
            max_attempts:       3,
            backoff_min_ms:     1_000,
            backoff_max_ms:     3_000,
            movement_ms:        1_000,
            max_concurrency:    30,
            global_deadline_ms: 300_000,
            seed:               42,
        }
    }
}

impl DispatchConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> YardResult<()> {
        if self.max_attempts == 0 {
            return Err(YardError::Config("max_attempts must be at least 1".into()));
        }
        if self.max_concurrency == 0 {
            return Err(YardError::Config("max_concurrency must be at least 1".into()));
        }
        if self.backoff_min_ms > self.backoff_max_ms {
            return Err(YardError::Config(format!(
                "backoff_min_ms ({}) exceeds backoff_max_ms ({})",
                self.backoff_min_ms, self.backoff_max_ms
            )));
        }
        if self.global_deadline_ms == 0 {
            return Err(YardError::Config("global_deadline_ms must be positive".into()));
        }
        Ok(())
    }

    // ── Duration accessors ────────────────────────────────────────────────

    #[inline]
    pub fn switch_timeout(&self) -> Duration {
        Duration::from_millis(self.switch_timeout_ms)
    }

    #[inline]
    pub fn backoff_min(&self) -> Duration {
        Duration::from_millis(self.backoff_min_ms)
    }

    #[inline]
    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    #[inline]
    pub fn movement(&self) -> Duration {
        Duration::from_millis(self.movement_ms)
    }

    #[inline]
    pub fn global_deadline(&self) -> Duration {
        Duration::from_millis(self.global_deadline_ms)
    }
}
