//! Nominator reconciliation.
//!
//! Stateless glue between the external selection pipeline and this
//! service: nomination decisions go to the ledger, liveness offline
//! events go to the reporting sink. The only guarantee is sequencing —
//! the ledger write completes (success or logged failure) before the
//! caller learns whether the decision was applied.

use std::sync::Arc;

use prometheus::IntCounter;

use stakewatch_ledger::NominationLedger;
use stakewatch_telemetry::ReportingSink;
use stakewatch_types::{EraIndex, Timestamp};

pub struct NominatorReconciler {
    ledger: Arc<NominationLedger>,
    sink: Arc<dyn ReportingSink>,
    nominations_applied: IntCounter,
}

impl NominatorReconciler {
    pub fn new(
        ledger: Arc<NominationLedger>,
        sink: Arc<dyn ReportingSink>,
        nominations_applied: IntCounter,
    ) -> Self {
        Self {
            ledger,
            sink,
            nominations_applied,
        }
    }

    /// Apply an external nomination decision. The returned boolean is the
    /// ledger's success signal.
    pub fn apply_nomination(&self, address: &str, target_stash: &str, era: EraIndex) -> bool {
        let applied = self.ledger.set_target(address, target_stash, era);
        if applied {
            self.nominations_applied.inc();
        } else {
            tracing::warn!(address, target = target_stash, era, "nomination decision not applied");
        }
        applied
    }

    /// Forward a liveness offline event, unmodified, to the reporting
    /// sink.
    pub fn forward_offline(&self, name: &str, since: Timestamp) {
        if let Err(e) = self.sink.report_offline(name, since) {
            tracing::warn!(node = name, "offline report failed: {e}");
        }
    }
}
