//! CSV loaders for yard and fleet files.
//!
//! # Yard file
//!
//! One route per record, no header row:
//!
//! ```csv
//! 1,101,102,103,9
//! 2,104,102,105,9
//! ```
//!
//! The first field is the inbound track, the last the outbound track, and
//! everything in between is the switch list in acquisition order.  Yards
//! in practice list exactly three switches, but any count ≥ 1 is accepted.
//!
//! # Fleet file
//!
//! One train per record, no header row: `train_number,inbound,outbound`.
//!
//! ```csv
//! 1,1,9
//! 2,2,9
//! 3,5,50
//! ```
//!
//! A train whose track pair has no route is still loaded; the dispatch
//! engine decides what to do with it.
//!
//! Fields are whitespace-trimmed and lines starting with `#` are skipped.
//! Any malformed record aborts the load and reports its line number.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use yard_core::{SwitchId, TrackId, TrainNumber};

use crate::{TopologyBuilder, TopologyError, TopologyResult};

// ── Fleet record ──────────────────────────────────────────────────────────────

/// One row of the fleet schedule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetEntry {
    pub train:    TrainNumber,
    pub inbound:  TrackId,
    pub outbound: TrackId,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read route definitions from a yard file into a builder.
///
/// Call [`TopologyBuilder::build`] on the result to validate and freeze it.
pub fn load_yard_csv(path: &Path) -> TopologyResult<TopologyBuilder> {
    let file = std::fs::File::open(path).map_err(TopologyError::Io)?;
    load_yard_reader(file)
}

/// Like [`load_yard_csv`] but accepts any `Read` source.
pub fn load_yard_reader<R: Read>(reader: R) -> TopologyResult<TopologyBuilder> {
    let mut csv_reader = headerless(reader);
    let mut builder = TopologyBuilder::new();

    for result in csv_reader.records() {
        let row = result?;
        let record = line_of(&row);
        if row.len() < 3 {
            return Err(TopologyError::Parse {
                record,
                message: format!(
                    "expected inbound, at least one switch, and outbound; got {} field(s)",
                    row.len()
                ),
            });
        }

        let last = row.len() - 1;
        let inbound = TrackId(parse_field(&row, 0, record)?);
        let outbound = TrackId(parse_field(&row, last, record)?);
        let switches = (1..last)
            .map(|i| parse_field(&row, i, record).map(SwitchId))
            .collect::<TopologyResult<Vec<_>>>()?;

        builder.add_route(inbound, &switches, outbound);
    }

    Ok(builder)
}

/// Load the fleet schedule in file order.
///
/// Train numbers must be unique.
pub fn load_fleet_csv(path: &Path) -> TopologyResult<Vec<FleetEntry>> {
    let file = std::fs::File::open(path).map_err(TopologyError::Io)?;
    load_fleet_reader(file)
}

/// Like [`load_fleet_csv`] but accepts any `Read` source.
pub fn load_fleet_reader<R: Read>(reader: R) -> TopologyResult<Vec<FleetEntry>> {
    let mut csv_reader = headerless(reader);
    let mut fleet = Vec::new();
    let mut trains: BTreeSet<TrainNumber> = BTreeSet::new();

    for result in csv_reader.records() {
        let row = result?;
        let record = line_of(&row);
        if row.len() != 3 {
            return Err(TopologyError::Parse {
                record,
                message: format!(
                    "expected train_number, inbound, outbound; got {} field(s)",
                    row.len()
                ),
            });
        }
        let entry: FleetEntry = row
            .deserialize(None)
            .map_err(|e| TopologyError::Parse { record, message: e.to_string() })?;

        if !trains.insert(entry.train) {
            return Err(TopologyError::DuplicateTrain(entry.train));
        }
        fleet.push(entry);
    }

    Ok(fleet)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn headerless<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader)
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map_or(0, |p| p.line())
}

fn parse_field(row: &StringRecord, index: usize, record: u64) -> TopologyResult<u32> {
    let raw = row.get(index).unwrap_or_default();
    raw.parse::<u32>().map_err(|_| TopologyError::Parse {
        record,
        message: format!("field {}: {raw:?} is not a non-negative integer", index + 1),
    })
}
