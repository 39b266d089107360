//! Telemetry configuration, read once at startup.

use serde::{Deserialize, Serialize};

/// Configuration for the feed connection and the liveness sweep.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// When false, `start` is a logged no-op and no feed tasks run.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// WebSocket endpoint of the telemetry feed.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Chain namespaces to subscribe to (one subscribe frame each).
    #[serde(default = "default_chains")]
    pub chains: Vec<String>,

    /// Continuous-disconnect duration before a node is classified offline.
    #[serde(default = "default_offline_threshold_secs")]
    pub offline_threshold_secs: u64,

    /// How often the offline sweep runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Consecutive connect failures tolerated before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for reconnect backoff; doubles per attempt.
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "ws://localhost:8000/feed".to_string()
}

fn default_chains() -> Vec<String> {
    vec!["polkadot".to_string()]
}

fn default_offline_threshold_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_base_secs() -> u64 {
    2
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: default_endpoint(),
            chains: default_chains(),
            offline_threshold_secs: default_offline_threshold_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_retries: default_max_retries(),
            backoff_base_secs: default_backoff_base_secs(),
        }
    }
}
