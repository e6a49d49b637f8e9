use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::types::Config;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML, JSON or TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        debug!(path = %path.display(), "loading configuration");

        let format = Format::from_path(path)
            .with_context(|| format!("unsupported config format: {}", path.display()))?;

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        Self::parse(&contents, format)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Parse and validate configuration in the given format
    pub fn parse(contents: &str, format: Format) -> Result<Self> {
        let config: Config = match format {
            Format::Yaml => {
                serde_yaml::from_str(contents).context("failed to parse YAML configuration")?
            }
            Format::Json => {
                serde_json::from_str(contents).context("failed to parse JSON configuration")?
            }
            Format::Toml => toml::from_str(contents).context("failed to parse TOML configuration")?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::parse(yaml, Format::Yaml)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.routing.workers == 0 {
            anyhow::bail!("routing.workers must be at least 1");
        }

        if self.routing.chunk_size == 0 {
            anyhow::bail!("routing.chunk_size must be at least 1");
        }

        // Same directive syntax as RUST_LOG, e.g. "callrouter=debug,info"
        if let Err(e) = EnvFilter::try_new(&self.telemetry.log_level) {
            anyhow::bail!(
                "invalid log filter '{}': {}",
                self.telemetry.log_level,
                e
            );
        }

        Ok(())
    }
}
