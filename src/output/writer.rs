//! Resolved cost writers.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::router::ResolvedCost;

/// Output writer errors.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `number,cost` lines
    #[default]
    Csv,
    /// JSON lines (one object per line)
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Record format
    #[serde(default)]
    pub format: OutputFormat,
    /// Emit a `number,cost` header line (CSV only)
    #[serde(default)]
    pub header: bool,
}

/// Streams resolved costs to a writer, one record per line.
pub struct CostWriter<W: Write> {
    writer: BufWriter<W>,
    format: OutputFormat,
    records: u64,
}

impl<W: Write> std::fmt::Debug for CostWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostWriter")
            .field("format", &self.format)
            .field("records", &self.records)
            .finish()
    }
}

impl<W: Write> CostWriter<W> {
    /// Wrap `writer`, writing the CSV header first when configured.
    pub fn new(writer: W, config: &OutputConfig) -> Result<Self, OutputError> {
        let mut writer = BufWriter::new(writer);
        if config.header && config.format == OutputFormat::Csv {
            writeln!(writer, "{}", csv_header())?;
        }

        Ok(Self {
            writer,
            format: config.format,
            records: 0,
        })
    }

    /// Write one record.
    pub fn write(&mut self, cost: &ResolvedCost) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Csv => writeln!(self.writer, "{}", cost)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, cost)
                    .map_err(|e| OutputError::Serialization(e.to_string()))?;
                self.writer.write_all(b"\n")?;
            }
        }
        self.records += 1;
        Ok(())
    }

    /// Write every record in order.
    pub fn write_all(&mut self, costs: &[ResolvedCost]) -> Result<(), OutputError> {
        for cost in costs {
            self.write(cost)?;
        }
        debug!(records = costs.len(), format = ?self.format, "wrote resolved costs");
        Ok(())
    }

    /// Records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flush and return the underlying writer.
    pub fn finish(self) -> Result<W, OutputError> {
        let records = self.records;
        let inner = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))?;
        info!(records, "output complete");
        Ok(inner)
    }
}

impl CostWriter<File> {
    /// Create (or truncate) `path` and write to it.
    pub fn create<P: AsRef<Path>>(path: P, config: &OutputConfig) -> Result<Self, OutputError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        info!(path = %path.display(), "writing resolved costs");
        Self::new(file, config)
    }
}

/// CSV header line.
pub fn csv_header() -> &'static str {
    "number,cost"
}
