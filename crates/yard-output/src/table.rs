//! Fixed-width text table.
//!
//! ```text
//! Final Train Status Report:
//! Train Number | Inbound Track | Outbound Track | Status
//! ------------------------------------------------------
//! 1            | 1             | 9              | Dispatched
//! 3            | 5             | 50             | Permanent Hold
//! ```

use std::io::Write;

use yard_dispatch::{DispatchReport, ReportRow};

use crate::OutputResult;
use crate::writer::ReportWriter;

const TITLE: &str = "Final Train Status Report:";
const HEADER: &str = "Train Number | Inbound Track | Outbound Track | Status";

/// Writes the report as a fixed-width table to any `io::Write` sink.
pub struct TableWriter<W: Write> {
    out:      W,
    finished: bool,
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, finished: false }
    }

    /// Recover the sink, e.g. to inspect a `Vec<u8>` in tests.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_row(&mut self, row: &ReportRow) -> OutputResult<()> {
        writeln!(
            self.out,
            "{:<12} | {:<13} | {:<14} | {}",
            row.train.get(),
            row.inbound.get(),
            row.outbound.get(),
            row.status
        )?;
        Ok(())
    }
}

impl<W: Write> ReportWriter for TableWriter<W> {
    fn write_report(&mut self, report: &DispatchReport) -> OutputResult<()> {
        writeln!(self.out, "{TITLE}")?;
        writeln!(self.out, "{HEADER}")?;
        writeln!(self.out, "{}", "-".repeat(HEADER.len()))?;
        for row in &report.rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
