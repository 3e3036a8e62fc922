//! `yard-agent`: one train's attempt to cross the yard.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`status`]   | `TrainStatus`, `HoldReason`, `AgentPhase`                  |
//! | [`agent`]    | `TrainAgent`, `agents_from_fleet`                          |
//! | [`observer`] | `AgentObserver` trait, `NoopObserver`, `LogObserver`       |
//!
//! # Protocol (one attempt)
//!
//! ```text
//! AcquiringSwitches ── all granted ──▶ Moving ──▶ ReleasingLocks ──▶ Dispatched
//!        │
//!        └─ timeout on switch k ──▶ ReleasingLocks (k-1 .. 1) ──▶ RetryWait
//!                                                                  │
//!                     attempts == max ──▶ PermanentHold ◀──────────┘
//! ```
//!
//! Switches are always locked in route order and released in reverse.  A
//! cancelled run releases whatever is held, in the same reverse order, and
//! finishes `Incomplete`.

pub mod agent;
pub mod observer;
pub mod status;


pub use agent::{TrainAgent, agents_from_fleet};
pub use observer::{AgentObserver, LogObserver, NoopObserver};
pub use status::{AgentPhase, HoldReason, TrainStatus};
