//! Prometheus metrics for the stakewatch service.
//!
//! The [`ServiceMetrics`] struct owns a dedicated [`Registry`] that the
//! ops `/metrics` endpoint encodes into the Prometheus text exposition
//! format. The feed connection receives a clone of the connectivity
//! gauge and toggles it on open/disconnect.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

/// Central collection of all service-level Prometheus metrics.
pub struct ServiceMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// 1 while the telemetry feed subscription is open, 0 otherwise.
    pub feed_connectivity: IntGauge,
    /// Nodes currently classified as disconnected (below the threshold).
    pub nodes_disconnected: IntGauge,
    /// Nodes currently classified as offline.
    pub nodes_offline: IntGauge,

    // ── Counters ────────────────────────────────────────────────────────
    /// Total feed events decoded and applied.
    pub feed_events_total: IntCounter,
    /// Total offline reports delivered to the reporting sink.
    pub offline_reports_total: IntCounter,
    /// Total online (recovery) reports delivered to the reporting sink.
    pub online_reports_total: IntCounter,
    /// Total nomination decisions applied through the reconciler.
    pub nominations_applied_total: IntCounter,
}

impl ServiceMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let feed_connectivity = register_int_gauge_with_registry!(
            Opts::new(
                "stakewatch_feed_connectivity",
                "Whether the telemetry feed subscription is open"
            ),
            registry
        )
        .expect("failed to register feed_connectivity gauge");

        let nodes_disconnected = register_int_gauge_with_registry!(
            Opts::new(
                "stakewatch_nodes_disconnected",
                "Nodes currently disconnected but below the offline threshold"
            ),
            registry
        )
        .expect("failed to register nodes_disconnected gauge");

        let nodes_offline = register_int_gauge_with_registry!(
            Opts::new(
                "stakewatch_nodes_offline",
                "Nodes currently classified offline"
            ),
            registry
        )
        .expect("failed to register nodes_offline gauge");

        let feed_events_total = register_int_counter_with_registry!(
            Opts::new("stakewatch_feed_events_total", "Total feed events applied"),
            registry
        )
        .expect("failed to register feed_events_total counter");

        let offline_reports_total = register_int_counter_with_registry!(
            Opts::new(
                "stakewatch_offline_reports_total",
                "Total offline reports delivered"
            ),
            registry
        )
        .expect("failed to register offline_reports_total counter");

        let online_reports_total = register_int_counter_with_registry!(
            Opts::new(
                "stakewatch_online_reports_total",
                "Total online recovery reports delivered"
            ),
            registry
        )
        .expect("failed to register online_reports_total counter");

        let nominations_applied_total = register_int_counter_with_registry!(
            Opts::new(
                "stakewatch_nominations_applied_total",
                "Total nomination decisions applied"
            ),
            registry
        )
        .expect("failed to register nominations_applied_total counter");

        Self {
            registry,
            feed_connectivity,
            nodes_disconnected,
            nodes_offline,
            feed_events_total,
            offline_reports_total,
            online_reports_total,
            nominations_applied_total,
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_and_gather() {
        let metrics = ServiceMetrics::new();
        metrics.feed_connectivity.set(1);
        metrics.feed_events_total.inc();

        let families = metrics.registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "stakewatch_feed_connectivity"));
        assert!(families
            .iter()
            .any(|f| f.get_name() == "stakewatch_feed_events_total"));
    }
}
