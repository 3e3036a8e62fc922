//! The `ReportWriter` trait implemented by all report formats.

use yard_dispatch::DispatchReport;

use crate::OutputResult;

/// Trait implemented by the table and CSV writers.
pub trait ReportWriter {
    /// Write every row of `report`.
    fn write_report(&mut self, report: &DispatchReport) -> OutputResult<()>;

    /// Flush the underlying sink.
    ///
    /// Idempotent, so safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
