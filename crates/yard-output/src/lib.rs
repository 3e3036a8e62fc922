//! `yard-output`: final status report writers.
//!
//! | Writer            | Output                                                 |
//! |-------------------|--------------------------------------------------------|
//! | [`TableWriter`]   | Fixed-width text table for a terminal or log file      |
//! | [`CsvReportWriter`] | `train_number,…,attempts` CSV with a header row      |
//!
//! Both implement [`ReportWriter`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use yard_output::{ReportWriter, TableWriter};
//!
//! let mut table = TableWriter::new(std::io::stdout().lock());
//! table.write_report(&report)?;
//! table.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod table;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvReportWriter;
pub use error::{OutputError, OutputResult};
pub use table::TableWriter;
pub use writer::ReportWriter;
