//! The monitor service — builds the stack and runs the background tasks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use stakewatch_ledger::NominationLedger;
use stakewatch_store::{CandidateStore, NominatorStore};
use stakewatch_store_lmdb::LmdbEnvironment;
use stakewatch_telemetry::{FeedConnection, FeedEvent, NodeLivenessTracker, ReportingSink};
use stakewatch_types::Timestamp;

use crate::config::ServiceConfig;
use crate::metrics::ServiceMetrics;
use crate::ops::OpsServer;
use crate::reconciler::NominatorReconciler;
use crate::reporter::StoreOfflineReporter;
use crate::shutdown::ShutdownController;
use crate::ServiceError;

/// Named LMDB databases plus headroom for migrations.
const LMDB_MAX_DBS: u32 = 8;

/// 1 GiB map size; nominator/candidate documents are tiny.
const LMDB_MAP_SIZE: usize = 1 << 30;

/// Capacity of the feed event channel between the pump and the apply
/// loop.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// The assembled service: stores, ledger, tracker, reconciler, and the
/// background tasks that tie them to the feed.
pub struct MonitorService {
    config: ServiceConfig,
    metrics: Arc<ServiceMetrics>,
    shutdown: ShutdownController,
    env: LmdbEnvironment,
    candidates: Arc<dyn CandidateStore>,
    ledger: Arc<NominationLedger>,
    reconciler: Arc<NominatorReconciler>,
    tracker: Arc<Mutex<NodeLivenessTracker>>,
    sink: Arc<dyn ReportingSink>,
    task_handles: Vec<JoinHandle<()>>,
}

impl MonitorService {
    /// Build the service. A persistence store that cannot be opened
    /// fails initialization explicitly.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let metrics = Arc::new(ServiceMetrics::new());

        let env = LmdbEnvironment::open(&config.data_dir, LMDB_MAX_DBS, LMDB_MAP_SIZE)?;
        tracing::info!(data_dir = %config.data_dir.display(), "opened persistence store");

        let nominators: Arc<dyn NominatorStore> = Arc::new(env.nominator_store());
        let candidates: Arc<dyn CandidateStore> = Arc::new(env.candidate_store());

        let ledger = Arc::new(NominationLedger::new(
            Arc::clone(&nominators),
            Arc::clone(&candidates),
        ));

        let sink: Arc<dyn ReportingSink> = Arc::new(StoreOfflineReporter::new(
            Arc::clone(&candidates),
            metrics.offline_reports_total.clone(),
            metrics.online_reports_total.clone(),
        ));

        let tracker = Arc::new(Mutex::new(NodeLivenessTracker::new(
            config.telemetry.offline_threshold_secs,
        )));

        let reconciler = Arc::new(NominatorReconciler::new(
            Arc::clone(&ledger),
            Arc::clone(&sink),
            metrics.nominations_applied_total.clone(),
        ));

        Ok(Self {
            config,
            metrics,
            shutdown: ShutdownController::new(),
            env,
            candidates,
            ledger,
            reconciler,
            tracker,
            sink,
            task_handles: Vec::new(),
        })
    }

    /// Spawn the background tasks: feed pump, event apply loop, offline
    /// sweep, and (if enabled) the ops endpoint.
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        let (events_tx, mut events_rx) = mpsc::channel::<FeedEvent>(EVENT_CHANNEL_CAPACITY);

        // ── Feed pump — owns the one FeedConnection ────────────────────
        let mut connection = FeedConnection::new(
            self.config.telemetry.clone(),
            self.metrics.feed_connectivity.clone(),
        );
        let mut shutdown_rx_feed = self.shutdown.subscribe();

        let feed_handle = tokio::spawn(async move {
            if connection.start(&mut shutdown_rx_feed).await {
                connection.run(events_tx, shutdown_rx_feed).await;
            }
            tracing::info!("feed pump task finished");
        });
        self.task_handles.push(feed_handle);

        // ── Event apply loop — feeds the liveness tracker ──────────────
        let tracker_apply = Arc::clone(&self.tracker);
        let sink_apply = Arc::clone(&self.sink);
        let metrics_apply = Arc::clone(&self.metrics);
        let mut shutdown_rx_apply = self.shutdown.subscribe();

        let apply_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx_apply.recv() => {
                        tracing::info!("event apply task shutting down");
                        break;
                    }
                    event = events_rx.recv() => {
                        let Some(event) = event else { break };
                        metrics_apply.feed_events_total.inc();
                        let now = Timestamp::now();
                        let mut tracker = tracker_apply.lock().expect("tracker lock poisoned");
                        tracker.apply(&event, now, sink_apply.as_ref());
                        metrics_apply.nodes_disconnected.set(tracker.disconnected_count() as i64);
                        metrics_apply.nodes_offline.set(tracker.offline_count() as i64);
                    }
                }
            }
        });
        self.task_handles.push(apply_handle);

        // ── Offline sweep — threshold promotion on a fixed interval ────
        let tracker_sweep = Arc::clone(&self.tracker);
        let sink_sweep = Arc::clone(&self.sink);
        let metrics_sweep = Arc::clone(&self.metrics);
        let sweep_secs = self.config.telemetry.sweep_interval_secs.max(1);
        let mut shutdown_rx_sweep = self.shutdown.subscribe();

        let sweep_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(sweep_secs));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx_sweep.recv() => {
                        tracing::info!("offline sweep task shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let now = Timestamp::now();
                        let mut tracker = tracker_sweep.lock().expect("tracker lock poisoned");
                        let promoted = tracker.check_offline(now, sink_sweep.as_ref());
                        if !promoted.is_empty() {
                            tracing::info!(count = promoted.len(), "nodes promoted to offline");
                        }
                        metrics_sweep.nodes_disconnected.set(tracker.disconnected_count() as i64);
                        metrics_sweep.nodes_offline.set(tracker.offline_count() as i64);
                    }
                }
            }
        });
        self.task_handles.push(sweep_handle);

        // ── Ops endpoint ───────────────────────────────────────────────
        if self.config.enable_ops {
            let ops = OpsServer::new(
                self.config.ops_port,
                self.metrics.registry.clone(),
                self.metrics.feed_connectivity.clone(),
            );
            let shutdown_rx_ops = self.shutdown.subscribe();
            let ops_handle = tokio::spawn(async move {
                if let Err(e) = ops.start(shutdown_rx_ops).await {
                    tracing::error!("ops endpoint failed: {e}");
                }
            });
            self.task_handles.push(ops_handle);
        }

        tracing::info!("service started");
        Ok(())
    }

    /// Block until SIGINT/SIGTERM triggers shutdown.
    pub async fn wait_for_signal(&self) {
        self.shutdown.wait_for_signal().await;
    }

    /// Stop all tasks, then flush and close the persistence store.
    pub async fn stop(&mut self) -> Result<(), ServiceError> {
        if !self.shutdown.is_triggered() {
            self.shutdown.shutdown();
        }
        for handle in self.task_handles.drain(..) {
            let _ = handle.await;
        }

        self.env.sync()?;
        tracing::info!("persistence store closed");
        Ok(())
    }

    pub fn ledger(&self) -> Arc<NominationLedger> {
        Arc::clone(&self.ledger)
    }

    pub fn reconciler(&self) -> Arc<NominatorReconciler> {
        Arc::clone(&self.reconciler)
    }

    /// Candidate-store handle for the external pipeline that owns
    /// candidate documents.
    pub fn candidate_store(&self) -> Arc<dyn CandidateStore> {
        Arc::clone(&self.candidates)
    }

    pub fn metrics(&self) -> Arc<ServiceMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }
}
