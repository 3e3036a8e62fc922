//! CSV report backend.
//!
//! Columns: `train_number,inbound_track,outbound_track,status,hold_reason,attempts`.
//! `hold_reason` is empty unless the status is `Permanent Hold`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use yard_dispatch::DispatchReport;

use crate::OutputResult;
use crate::writer::ReportWriter;

const COLUMNS: [&str; 6] = [
    "train_number",
    "inbound_track",
    "outbound_track",
    "status",
    "hold_reason",
    "attempts",
];

/// Writes the report as CSV with a header row.
pub struct CsvReportWriter<W: Write = File> {
    writer:   Writer<W>,
    finished: bool,
}

impl CsvReportWriter<File> {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> OutputResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvReportWriter<W> {
    pub fn from_writer(out: W) -> OutputResult<Self> {
        let mut writer = Writer::from_writer(out);
        writer.write_record(COLUMNS)?;
        Ok(Self { writer, finished: false })
    }
}

impl<W: Write> ReportWriter for CsvReportWriter<W> {
    fn write_report(&mut self, report: &DispatchReport) -> OutputResult<()> {
        for row in &report.rows {
            self.writer.write_record(&[
                row.train.to_string(),
                row.inbound.to_string(),
                row.outbound.to_string(),
                row.status.to_string(),
                row.hold_reason.map(|r| r.to_string()).unwrap_or_default(),
                row.attempts.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}
