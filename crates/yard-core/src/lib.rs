//! `yard-core`: foundational types for the switch-yard dispatch simulator.
//!
//! This crate is a dependency of every other `yard-*` crate.  It has no
//! `yard-*` dependencies and only a handful of external ones (`rand`,
//! `thiserror`, `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `SwitchId`, `TrackId`, `TrainNumber`                  |
//! | [`config`]      | `DispatchConfig` (timeouts, attempts, pool size)      |
//! | [`rng`]         | `TrainRng` (per-train backoff jitter)                 |
//! | [`cancel`]      | `CancelToken`, `CancelReason`, `Wake`                 |
//! | [`error`]       | `YardError`, `YardResult`                             |

pub mod cancel;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cancel::{CancelReason, CancelToken, Wake};
pub use config::DispatchConfig;
pub use error::{YardError, YardResult};
pub use ids::{SwitchId, TrackId, TrainNumber};
pub use rng::TrainRng;
