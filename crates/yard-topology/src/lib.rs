//! `yard-topology`: routes through the yard and the switches they share.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`route`]     | `Route`, the ordered switch list for one track pair          |
//! | [`topology`]  | `Topology` (read-only lookup), `TopologyBuilder`          |
//! | [`loader`]    | `load_yard_csv`, `load_fleet_csv`, `FleetEntry`           |
//! | [`error`]     | `TopologyError`, `TopologyResult<T>`                      |
//!
//! # Acquisition order
//!
//! A route's switch order is the order a train must lock them in.  Trains
//! on different routes can only deadlock if the routes disagree on the
//! relative order of some switches, directly or through a chain of routes.
//! [`TopologyBuilder::build`] checks the precedence graph for cycles and
//! rejects such yards up front.

pub mod error;
pub mod loader;
pub mod route;
pub mod topology;


pub use error::{TopologyError, TopologyResult};
pub use loader::{FleetEntry, load_fleet_csv, load_fleet_reader, load_yard_csv, load_yard_reader};
pub use route::Route;
pub use topology::{Topology, TopologyBuilder};
