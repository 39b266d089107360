//! Validator candidate snapshots.
//!
//! Candidates are owned by the wider monitoring pipeline; this service
//! reads them by stash and writes two things back: the era a candidate
//! was last nominated in, and offline bookkeeping recorded by the
//! telemetry reporting path.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;
use crate::EraIndex;

/// On-chain identity attached to a candidate, if it has registered one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub display: String,
    /// Sub-identity label, for candidates under a parent identity.
    pub sub: Option<String>,
    pub verified: bool,
}

/// A validator candidate, keyed by stash account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Telemetry node name.
    pub name: String,
    pub stash: String,
    pub identity: Option<Identity>,
    /// Era this candidate was last nominated in, if ever.
    pub nominated_at: Option<EraIndex>,
    /// When the node was last seen going offline; `EPOCH` when online.
    pub offline_since: Timestamp,
    /// Total accumulated downtime, in seconds.
    pub offline_accumulated: u64,
}

impl Candidate {
    pub fn new(name: impl Into<String>, stash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stash: stash.into(),
            identity: None,
            nominated_at: None,
            offline_since: Timestamp::EPOCH,
            offline_accumulated: 0,
        }
    }
}
