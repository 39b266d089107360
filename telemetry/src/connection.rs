//! Outbound feed connection.
//!
//! Owns the single WebSocket subscription to the telemetry feed. Connect
//! failures are retried with exponential backoff up to a ceiling; past
//! the ceiling the connection goes idle until externally restarted. All
//! backoff sleeps race against the shutdown channel, so process shutdown
//! is never delayed by a pending multi-second sleep.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use prometheus::IntGauge;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::TelemetryConfig;
use crate::error::FeedError;
use crate::event::FeedEvent;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Timeout for the initial connection attempt (TCP + WebSocket upgrade).
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Base delay for the startup backoff; `reconnect` uses the configured
/// base instead.
const START_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Exponential backoff delay for the given attempt: `base * 2^attempt`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(31))
}

/// One outbound subscription to the telemetry feed.
///
/// Operations are never invoked concurrently with themselves; the service
/// runs exactly one task that owns the connection.
pub struct FeedConnection {
    config: TelemetryConfig,
    socket: Option<WsStream>,
    connected: bool,
    connectivity: IntGauge,
}

enum Step {
    Shutdown,
    Frame(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
}

impl FeedConnection {
    pub fn new(config: TelemetryConfig, connectivity: IntGauge) -> Self {
        Self {
            config,
            socket: None,
            connected: false,
            connectivity,
        }
    }

    /// Open the subscription: connect, then send one subscribe frame per
    /// configured chain.
    pub async fn connect(&mut self) -> Result<(), FeedError> {
        let endpoint = self.config.endpoint.clone();
        let (mut socket, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(&endpoint))
            .await
            .map_err(|_| FeedError::Connection(format!("timed out connecting to {endpoint}")))?
            .map_err(|e| FeedError::Connection(format!("connect to {endpoint} failed: {e}")))?;

        for chain in &self.config.chains {
            socket
                .send(Message::Text(format!("subscribe:{chain}")))
                .await
                .map_err(|e| FeedError::Subscribe(format!("subscribe to {chain} failed: {e}")))?;
        }

        self.socket = Some(socket);
        self.set_connected(true);
        tracing::info!(endpoint = %endpoint, chains = self.config.chains.len(), "feed connected");
        Ok(())
    }

    /// Initial connection with startup backoff (1 s, doubling). A feed
    /// disabled by configuration is a logged no-op. Returns whether the
    /// connection is up afterwards.
    pub async fn start(&mut self, shutdown: &mut broadcast::Receiver<()>) -> bool {
        if !self.config.enabled {
            tracing::warn!("telemetry feed disabled by configuration");
            return false;
        }
        self.connect_with_retries(self.config.max_retries, START_BACKOFF_BASE, shutdown)
            .await
    }

    /// Reconnection after a live drop, with the configured backoff base.
    /// On exhaustion the connection stays down until externally restarted.
    pub async fn reconnect(&mut self, shutdown: &mut broadcast::Receiver<()>) -> bool {
        let base = Duration::from_secs(self.config.backoff_base_secs);
        self.connect_with_retries(self.config.max_retries, base, shutdown)
            .await
    }

    async fn connect_with_retries(
        &mut self,
        max_retries: u32,
        base: Duration,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> bool {
        for attempt in 0..max_retries {
            match self.connect().await {
                Ok(()) => return true,
                Err(e) => {
                    tracing::error!(attempt, "feed connection error: {e}");
                }
            }
            if attempt + 1 == max_retries {
                break;
            }

            let delay = backoff_delay(base, attempt);
            tracing::info!(delay_ms = delay.as_millis() as u64, "retrying feed connection");
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("shutdown during feed backoff");
                    return false;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
        tracing::error!(max_retries, "maximum retry attempts reached, giving up");
        false
    }

    /// Pump loop: decode inbound frames into [`FeedEvent`]s and forward
    /// them on `events`. A dropped stream triggers [`reconnect`]; an
    /// exhausted reconnect leaves the connection idle and returns.
    pub async fn run(
        &mut self,
        events: mpsc::Sender<FeedEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            if self.socket.is_none() {
                return;
            }

            let step = {
                let socket = self.socket.as_mut().expect("socket checked above");
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => Step::Shutdown,
                    frame = socket.next() => Step::Frame(frame),
                }
            };

            match step {
                Step::Shutdown => {
                    self.disconnect().await;
                    return;
                }
                Step::Frame(Some(Ok(Message::Text(text)))) => {
                    match serde_json::from_str::<FeedEvent>(&text) {
                        Ok(event) => {
                            if events.send(event).await.is_err() {
                                // Receiver gone; the service is stopping.
                                self.disconnect().await;
                                return;
                            }
                        }
                        Err(e) => tracing::debug!("ignoring unrecognized feed frame: {e}"),
                    }
                }
                Step::Frame(Some(Ok(Message::Close(_)))) | Step::Frame(None) => {
                    tracing::warn!("feed connection closed by remote");
                    self.drop_socket();
                    if !self.reconnect(&mut shutdown).await {
                        tracing::error!("feed reconnect exhausted; staying down until restarted");
                        return;
                    }
                }
                Step::Frame(Some(Ok(_))) => {} // ping/pong/binary
                Step::Frame(Some(Err(e))) => {
                    tracing::warn!("feed read error: {e}");
                    self.drop_socket();
                    if !self.reconnect(&mut shutdown).await {
                        tracing::error!("feed reconnect exhausted; staying down until restarted");
                        return;
                    }
                }
            }
        }
    }

    /// True iff the subscription is currently open. Warns when it is not;
    /// never touches the connection itself.
    pub fn check_health(&self) -> bool {
        if !self.connected {
            tracing::warn!("telemetry feed is unhealthy");
        }
        self.connected
    }

    /// Close the subscription. Safe to call at any time, repeatedly.
    pub async fn disconnect(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None).await;
        }
        if self.connected {
            self.set_connected(false);
            tracing::info!("feed disconnected");
        }
    }

    fn drop_socket(&mut self) {
        self.socket = None;
        self.set_connected(false);
    }

    fn set_connected(&mut self, up: bool) {
        self.connected = up;
        self.connectivity.set(up as i64);
    }
}
