//! Line parsers for route and phone number sources.
//!
//! Route lines are `prefix,price`; number lines hold one number each. Both
//! accept a leading `+`, surrounding whitespace and blank lines.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::router::{InsertOutcome, Prefix, PrefixCostTable, PrefixError};

use super::records::{PhoneNumber, RouteRecord};

/// What to do with a malformed route record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRecordPolicy {
    /// Stop ingestion and return the error
    #[default]
    Abort,
    /// Log a warning and continue with the next line
    Skip,
}

/// Why a single route line was rejected.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing ',' between prefix and price")]
    MissingPrice,

    #[error("invalid prefix: {0}")]
    InvalidPrefix(#[from] PrefixError),

    #[error("invalid price '{value}': {source}")]
    InvalidPrice {
        value: String,
        source: rust_decimal::Error,
    },

    #[error("negative price {0}")]
    NegativePrice(Decimal),

    #[error("line is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

/// Ingestion errors.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    InvalidRecord { line: usize, reason: RecordError },
}

/// Counters from one route ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Lines read, blank lines included
    pub lines: usize,
    /// Well-formed records folded into the table
    pub records: usize,
    /// Records that created a new prefix
    pub inserted: usize,
    /// Duplicate records that lowered a stored price
    pub lowered: usize,
    /// Duplicate records that left the stored price unchanged
    pub kept: usize,
    /// Malformed records skipped
    pub skipped: usize,
}

impl IngestStats {
    fn record(&mut self, outcome: InsertOutcome) {
        self.records += 1;
        match outcome {
            InsertOutcome::Inserted => self.inserted += 1,
            InsertOutcome::Lowered { .. } => self.lowered += 1,
            InsertOutcome::Kept => self.kept += 1,
        }
    }
}

/// Parse one route line. Blank lines yield `Ok(None)`.
pub fn parse_route_line(line: &str) -> Result<Option<RouteRecord>, RecordError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (prefix, price) = line.split_once(',').ok_or(RecordError::MissingPrice)?;
    let prefix = Prefix::new(strip_plus(prefix.trim()))?;

    let price = price.trim();
    let price = Decimal::from_str(price).map_err(|source| RecordError::InvalidPrice {
        value: price.to_string(),
        source,
    })?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(RecordError::NegativePrice(price));
    }

    Ok(Some(RouteRecord { prefix, price }))
}

/// Parse one phone number line. Blank lines yield `None`.
pub fn parse_number_line(line: &str) -> Option<PhoneNumber> {
    let number = strip_plus(line.trim());
    if number.is_empty() {
        None
    } else {
        Some(PhoneNumber::new(number))
    }
}

fn strip_plus(s: &str) -> &str {
    s.strip_prefix('+').unwrap_or(s)
}

/// Fold every route record from `reader` into `table`.
pub fn load_routes<R, T>(
    mut reader: R,
    table: &mut T,
    policy: InvalidRecordPolicy,
) -> Result<IngestStats, IngestError>
where
    R: BufRead,
    T: PrefixCostTable + ?Sized,
{
    let mut stats = IngestStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines += 1;

        let parsed = std::str::from_utf8(&buf)
            .map_err(RecordError::from)
            .and_then(parse_route_line);

        match parsed {
            Ok(Some(record)) => {
                let outcome = table.insert_or_keep_cheaper(&record.prefix, record.price);
                stats.record(outcome);
            }
            Ok(None) => {}
            Err(reason) => match policy {
                InvalidRecordPolicy::Abort => {
                    return Err(IngestError::InvalidRecord {
                        line: stats.lines,
                        reason,
                    });
                }
                InvalidRecordPolicy::Skip => {
                    warn!(line = stats.lines, error = %reason, "skipping malformed route record");
                    stats.skipped += 1;
                }
            },
        }
    }

    info!(
        lines = stats.lines,
        records = stats.records,
        prefixes = table.len(),
        lowered = stats.lowered,
        kept = stats.kept,
        skipped = stats.skipped,
        "loaded route table"
    );

    Ok(stats)
}

/// Load routes from a file.
pub fn load_routes_from_path<P, T>(
    path: P,
    table: &mut T,
    policy: InvalidRecordPolicy,
) -> Result<IngestStats, IngestError>
where
    P: AsRef<Path>,
    T: PrefixCostTable + ?Sized,
{
    let path = path.as_ref();
    debug!(path = %path.display(), "reading routes");
    let file = File::open(path)?;
    load_routes(BufReader::new(file), table, policy)
}

/// Read phone numbers in order, skipping blank lines.
pub fn read_numbers<R: BufRead>(reader: R) -> Result<Vec<PhoneNumber>, IngestError> {
    let mut numbers = Vec::new();
    for line in reader.lines() {
        if let Some(number) = parse_number_line(&line?) {
            numbers.push(number);
        }
    }

    debug!(numbers = numbers.len(), "read phone numbers");
    Ok(numbers)
}

/// Read phone numbers from a file.
pub fn read_numbers_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PhoneNumber>, IngestError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading phone numbers");
    let file = File::open(path)?;
    read_numbers(BufReader::new(file))
}
