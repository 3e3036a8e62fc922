//! `yard-dispatch`: runs every train in the fleet to completion.
//!
//! # Run
//!
//! ```text
//! build:  validate config, reject duplicate train numbers
//! run:    ① register every switch with the cancel token
//!         ② trains with no route → PermanentHold (no worker slot)
//!         ③ remaining trains → bounded rayon pool, one task each
//!         ④ collect finished agents over a channel until the deadline
//!         ⑤ deadline hit → cancel(Deadline), keep collecting until every
//!            task has released its switches and returned
//!         ⑥ build the DispatchReport, sorted by train number
//! ```
//!
//! An operator cancel (`cancel_token().cancel(CancelReason::Operator)`)
//! drains the same way and then returns [`DispatchError::Cancelled`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use yard_agent::{LogObserver, agents_from_fleet};
//! use yard_dispatch::EngineBuilder;
//!
//! let agents = agents_from_fleet(&fleet, &topology, config.seed);
//! let engine = EngineBuilder::new(config, Arc::new(topology))
//!     .agents(agents)
//!     .build()?;
//! let report = engine.run(Arc::new(LogObserver))?;
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod report;

#[cfg(test)]
mod tests;

pub use builder::EngineBuilder;
pub use engine::DispatchEngine;
pub use error::{DispatchError, DispatchResult};
pub use report::{DispatchReport, ReportRow, StatusSummary};
