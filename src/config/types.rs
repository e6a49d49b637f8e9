use serde::Deserialize;

use crate::ingest::InvalidRecordPolicy;
use crate::output::OutputConfig;
use crate::router::{Backend, MatchBoundary};

/// Root configuration for callrouter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Prefix table and resolution settings
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Route ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Result output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Routing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Table backend
    #[serde(default)]
    pub backend: Backend,

    /// Whether a number may match a prefix equal to itself
    #[serde(default)]
    pub boundary: MatchBoundary,

    /// Concurrent resolution tasks (1 = resolve on the calling thread)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Numbers per resolution task
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            boundary: MatchBoundary::default(),
            workers: default_workers(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_workers() -> usize {
    1
}

fn default_chunk_size() -> usize {
    1024
}

/// Ingestion configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestConfig {
    /// Policy for malformed route records
    #[serde(default)]
    pub on_invalid: InvalidRecordPolicy,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
