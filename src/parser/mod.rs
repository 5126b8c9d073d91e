use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::trace;

use crate::aggregator::Aggregator;
use crate::datatype::FlowRecord;
use crate::error::{Error, Result};
use crate::protocol;

const MIN_FIELDS:     usize = 8;  // Records shorter than this carry no usable port/protocol
const PORT_FIELD:     usize = 6;  // Destination port (0-based)
const PROTOCOL_FIELD: usize = 7;  // IANA protocol number (0-based)

// Log-status values of flows that captured no traffic
const NO_DATA_MARKERS: [&str; 2] = ["NODATA", "SKIPDATA"];

/// Why a line was left out of the counts
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SkipReason {
    /// Fewer than eight fields
    TooFewFields(usize),
    /// Log status is NODATA or SKIPDATA
    NoData(&'static str),
}

/// Outcome of parsing one line
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Parsed {
    Record(FlowRecord),
    Skip(SkipReason),
}

/// Line counters for a whole flow log
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct ParseStats {
    pub lines:   u64,
    pub records: u64,
    pub skipped: u64,
}

/// Turn one flow-log line into a record, or decide to skip it.
///
/// Skipping is routine. The only error is an eligible line whose
/// destination port is not a number. Numbers above 65535 are kept: they
/// never match the lookup table and are counted as untagged.
pub fn parse_line(line: &str) -> std::result::Result<Parsed, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() < MIN_FIELDS {
        return Ok(Parsed::Skip(SkipReason::TooFewFields(fields.len())));
    }

    let status = fields[fields.len() - 1];
    if let Some(marker) = NO_DATA_MARKERS.iter().find(|m| **m == status) {
        return Ok(Parsed::Skip(SkipReason::NoData(*marker)));
    }

    let port: u32 = fields[PORT_FIELD]
        .parse()
        .map_err(|_| format!("destination port {:?} is not a number", fields[PORT_FIELD]))?;
    let protocol = protocol::resolve(fields[PROTOCOL_FIELD]);

    Ok(Parsed::Record(FlowRecord::new(port, protocol)))
}

/// Feed every eligible line of `reader` into the aggregator.
/// `origin` only labels errors.
pub fn process_logs<R: BufRead>(reader: R, origin: &Path, aggregator: &mut Aggregator) -> Result<ParseStats> {
    let mut stats = ParseStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index as u64 + 1;
        let line = line.map_err(|source| Error::Io { path: origin.to_path_buf(), source })?;
        stats.lines += 1;

        let parsed = parse_line(&line).map_err(|reason| Error::FlowFormat {
            path: origin.to_path_buf(),
            line: line_no,
            reason,
        })?;

        match parsed {
            Parsed::Record(record) => {
                stats.records += 1;
                aggregator.record(&record);
            }
            Parsed::Skip(reason) => {
                stats.skipped += 1;
                trace!(line = line_no, ?reason, "skipped");
            }
        }
    }

    Ok(stats)
}

/// Open the flow log at `path` and process it line by line.
pub fn process_file(path: &Path, aggregator: &mut Aggregator) -> Result<ParseStats> {
    let file = File::open(path).map_err(|source| Error::ResourceNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    process_logs(BufReader::new(file), path, aggregator)
}
