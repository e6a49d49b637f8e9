mod tracing;

pub use self::tracing::{init_tracing, TracingConfig};

use crate::config::TelemetryConfig;

impl From<&TelemetryConfig> for TracingConfig {
    fn from(config: &TelemetryConfig) -> Self {
        Self {
            service_name: "callrouter".to_string(),
            log_level: config.log_level.clone(),
            json_logs: config.json_logs,
        }
    }
}
