//! Reporting sink consumed by the liveness tracker.

use thiserror::Error;

use stakewatch_types::Timestamp;

/// A single failed report. The tracker logs these and moves on; one
/// failing report must never block the others in a sweep.
#[derive(Debug, Error)]
#[error("report failed: {0}")]
pub struct ReportError(pub String);

/// Destination for liveness transitions. The concrete sink is owned by
/// the service layer; the tracker only sequences the calls.
pub trait ReportingSink: Send + Sync {
    /// A node crossed the offline threshold. `since` is the node's
    /// original disconnect time, not the sweep time.
    fn report_offline(&self, name: &str, since: Timestamp) -> Result<(), ReportError>;

    /// A previously-offline node produced a heartbeat again.
    fn report_online(&self, name: &str, seen: Timestamp) -> Result<(), ReportError>;
}
