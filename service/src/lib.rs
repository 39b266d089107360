//! Service orchestration for the stakewatch monitor.
//!
//! Builds the full stack — LMDB stores, nomination ledger, feed
//! connection, liveness tracker — and runs the background tasks that tie
//! them together: the feed pump, the event apply loop, the offline sweep,
//! and the ops HTTP endpoint. Also owns the ambient pieces: config,
//! logging, metrics, and graceful shutdown.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod ops;
pub mod reconciler;
pub mod reporter;
pub mod service;
pub mod shutdown;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use logging::{init_logging, LogFormat};
pub use metrics::ServiceMetrics;
pub use ops::OpsServer;
pub use reconciler::NominatorReconciler;
pub use reporter::StoreOfflineReporter;
pub use service::MonitorService;
pub use shutdown::ShutdownController;
