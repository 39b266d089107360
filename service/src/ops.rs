//! Ops HTTP endpoint.
//!
//! Serves `/health` (feed connectivity probe) and `/metrics` (Prometheus
//! text exposition) when enabled by configuration.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};
use tokio::sync::broadcast;

use crate::ServiceError;

struct OpsState {
    registry: Registry,
    feed_connectivity: IntGauge,
}

pub struct OpsServer {
    pub port: u16,
    state: Arc<OpsState>,
}

impl OpsServer {
    pub fn new(port: u16, registry: Registry, feed_connectivity: IntGauge) -> Self {
        Self {
            port,
            state: Arc::new(OpsState {
                registry,
                feed_connectivity,
            }),
        }
    }

    /// Serve until the shutdown signal fires.
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServiceError> {
        let app = Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(Arc::clone(&self.state));

        let addr = format!("0.0.0.0:{}", self.port);
        tracing::info!("ops endpoint listening on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServiceError::Ops(e.to_string()))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(|e| ServiceError::Ops(e.to_string()))
    }
}

async fn health_handler(State(state): State<Arc<OpsState>>) -> impl IntoResponse {
    if state.feed_connectivity.get() == 1 {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "feed disconnected")
    }
}

async fn metrics_handler(State(state): State<Arc<OpsState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    match encoder.encode(&state.registry.gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            String::from_utf8(buffer).unwrap_or_default(),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceMetrics;

    fn state() -> (Arc<ServiceMetrics>, Arc<OpsState>) {
        let metrics = Arc::new(ServiceMetrics::new());
        let state = Arc::new(OpsState {
            registry: metrics.registry.clone(),
            feed_connectivity: metrics.feed_connectivity.clone(),
        });
        (metrics, state)
    }

    #[tokio::test]
    async fn health_follows_feed_connectivity() {
        let (metrics, state) = state();

        // Down by default.
        let response = health_handler(State(Arc::clone(&state))).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        metrics.feed_connectivity.set(1);
        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_exposition_contains_registered_families() {
        let (metrics, state) = state();
        metrics.feed_events_total.inc();

        let response = metrics_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("stakewatch_feed_events_total"));
    }
}
