//! Service configuration with TOML file support.
//!
//! Read once at startup and immutable thereafter. Every field has a
//! serde default so a partial (or empty) TOML file works.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use stakewatch_telemetry::TelemetryConfig;

use crate::ServiceError;

/// Configuration for the stakewatch service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`]
/// or built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Feed connection and liveness sweep settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Data directory for the LMDB store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Whether to serve `/health` and `/metrics`.
    #[serde(default)]
    pub enable_ops: bool,

    /// Port for the ops endpoint (if enabled).
    #[serde(default = "default_ops_port")]
    pub ops_port: u16,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./stakewatch_data")
}

fn default_ops_port() -> u16 {
    9615
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ServiceError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ServiceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConfig::default(),
            data_dir: default_data_dir(),
            enable_ops: false,
            ops_port: default_ops_port(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServiceConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = ServiceConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.ops_port, config.ops_port);
        assert_eq!(parsed.telemetry.offline_threshold_secs, 300);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.ops_port, 9615);
        assert_eq!(config.log_format, "human");
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.max_retries, 5);
        assert_eq!(config.telemetry.backoff_base_secs, 2);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            ops_port = 9999

            [telemetry]
            offline_threshold_secs = 120
            chains = ["polkadot", "kusama"]
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.ops_port, 9999);
        assert_eq!(config.telemetry.offline_threshold_secs, 120);
        assert_eq!(config.telemetry.chains.len(), 2);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ServiceConfig::from_toml_file("/nonexistent/stakewatch.toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }
}
