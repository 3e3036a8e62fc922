//! Integration tests for yard-output.

use std::time::Duration;

use yard_agent::{HoldReason, TrainStatus};
use yard_core::{TrackId, TrainNumber};
use yard_dispatch::{DispatchReport, ReportRow};

fn row(train: u32, inbound: u32, outbound: u32, status: TrainStatus, attempts: u32) -> ReportRow {
    let hold_reason = match status {
        TrainStatus::PermanentHold if attempts == 0 => Some(HoldReason::NoRoute),
        TrainStatus::PermanentHold => Some(HoldReason::AttemptsExhausted),
        _ => None,
    };
    ReportRow {
        train: TrainNumber(train),
        inbound: TrackId(inbound),
        outbound: TrackId(outbound),
        status,
        hold_reason,
        attempts,
    }
}

fn sample_report() -> DispatchReport {
    DispatchReport {
        rows: vec![
            row(1, 1, 9, TrainStatus::Dispatched, 1),
            row(2, 2, 9, TrainStatus::PermanentHold, 3),
            row(3, 5, 50, TrainStatus::PermanentHold, 0),
            row(4, 12, 7, TrainStatus::Incomplete, 2),
        ],
        elapsed:          Duration::from_millis(1234),
        deadline_expired: true,
    }
}

#[cfg(test)]
mod table_tests {
    use super::*;

    use crate::{ReportWriter, TableWriter};

    fn render(report: &DispatchReport) -> String {
        let mut w = TableWriter::new(Vec::new());
        w.write_report(report).unwrap();
        w.finish().unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn header_and_rule() {
        let text = render(&sample_report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Final Train Status Report:");
        assert_eq!(lines[1], "Train Number | Inbound Track | Outbound Track | Status");
        assert_eq!(lines[2], "-".repeat(54));
    }

    #[test]
    fn rows_are_fixed_width() {
        let text = render(&sample_report());
        let lines: Vec<&str> = text.lines().skip(3).collect();
        assert_eq!(
            lines,
            vec![
                "1            | 1             | 9              | Dispatched",
                "2            | 2             | 9              | Permanent Hold",
                "3            | 5             | 50             | Permanent Hold",
                "4            | 12            | 7              | Incomplete",
            ]
        );
    }

    #[test]
    fn empty_report_prints_header_only() {
        let report = DispatchReport { rows: Vec::new(), elapsed: Duration::ZERO, deadline_expired: false };
        assert_eq!(render(&report).lines().count(), 3);
    }

    #[test]
    fn finish_is_idempotent() {
        let mut w = TableWriter::new(Vec::new());
        w.finish().unwrap();
        w.finish().unwrap();
        assert!(w.into_inner().is_empty());
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;

    use crate::{CsvReportWriter, ReportWriter};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let path = dir.path().join("report.csv");
        let mut w = CsvReportWriter::create(&path).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers,
            ["train_number", "inbound_track", "outbound_track", "status", "hold_reason", "attempts"]
        );
        assert_eq!(rdr.records().count(), 0);
    }

    #[test]
    fn csv_rows_carry_reason_and_attempts() {
        let dir = tmp();
        let path = dir.path().join("report.csv");
        let mut w = CsvReportWriter::create(&path).unwrap();
        w.write_report(&sample_report()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 4);
        assert_eq!(&records[0], vec!["1", "1", "9", "Dispatched", "", "1"]);
        assert_eq!(&records[1], vec!["2", "2", "9", "Permanent Hold", "attempts exhausted", "3"]);
        assert_eq!(&records[2], vec!["3", "5", "50", "Permanent Hold", "no route", "0"]);
        assert_eq!(&records[3], vec!["4", "12", "7", "Incomplete", "", "2"]);
    }

    #[test]
    fn in_memory_writer() {
        let mut w = CsvReportWriter::from_writer(Vec::new()).unwrap();
        w.write_report(&sample_report()).unwrap();
        w.finish().unwrap();
    }
}
