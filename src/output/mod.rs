//! Resolved cost output.
//!
//! Writes `(number, cost)` records in input order as CSV or JSON lines.

mod writer;

pub use writer::{csv_header, CostWriter, OutputConfig, OutputError, OutputFormat};
