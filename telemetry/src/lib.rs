//! Telemetry feed client and node liveness tracking.
//!
//! One [`FeedConnection`] holds the outbound WebSocket subscription to the
//! telemetry feed and pumps decoded [`FeedEvent`]s into a channel. The
//! [`NodeLivenessTracker`] consumes those events and classifies nodes as
//! connected, disconnected, or offline; a periodic sweep promotes nodes
//! that have been disconnected past the configured threshold and reports
//! each promotion through the [`ReportingSink`].

pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod liveness;
pub mod sink;

pub use config::TelemetryConfig;
pub use connection::{backoff_delay, FeedConnection};
pub use error::FeedError;
pub use event::FeedEvent;
pub use liveness::{NodeLiveness, NodeLivenessTracker};
pub use sink::{ReportError, ReportingSink};
