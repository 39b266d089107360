//! Nominator account records.
//!
//! A nominator is keyed by its controller address. The `current` sequence
//! holds denormalized snapshots of the validators it is presently backing;
//! those snapshots are taken at assignment time and are intentionally not
//! live references into the candidate registry — a candidate renamed after
//! assignment keeps its old name here until the next assignment.

use serde::{Deserialize, Serialize};

use crate::candidate::Identity;
use crate::time::Timestamp;

/// Persisted per-nominator document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NominatorRecord {
    /// Controller account — the unique key.
    pub address: String,
    /// Stash account holding the bonded funds.
    pub stash: String,
    /// Proxy account managing the nomination, if any.
    pub proxy: String,
    /// Announcement delay (in blocks) for a time-delay proxy.
    pub proxy_delay: u64,
    /// Where staking rewards are paid.
    pub reward_destination: String,
    /// Bonded amount, in plancks.
    pub bonded: u128,
    pub created_at: Timestamp,
    /// When targets were last assigned. `Timestamp::EPOCH` until the
    /// first nomination.
    pub last_nomination: Timestamp,
    /// Validators currently backed, in assignment order.
    pub current: Vec<CurrentTarget>,
}

/// Snapshot of a nominated candidate, captured at assignment time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentTarget {
    pub name: String,
    pub stash: String,
    pub identity: Option<Identity>,
}

/// Identity/config fields supplied on each upsert. Everything a nominator
/// record holds except the ledger-owned `current` and `last_nomination`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NominatorRegistration {
    pub address: String,
    pub stash: String,
    pub proxy: String,
    pub proxy_delay: u64,
    pub reward_destination: String,
    pub bonded: u128,
    pub created_at: Timestamp,
}

impl NominatorRegistration {
    /// Materialize a fresh record: empty targets, no nomination yet.
    pub fn into_new_record(self) -> NominatorRecord {
        NominatorRecord {
            address: self.address,
            stash: self.stash,
            proxy: self.proxy,
            proxy_delay: self.proxy_delay,
            reward_destination: self.reward_destination,
            bonded: self.bonded,
            created_at: self.created_at,
            last_nomination: Timestamp::EPOCH,
            current: Vec::new(),
        }
    }

    /// Overwrite the identity/config fields of an existing record,
    /// leaving `current` and `last_nomination` untouched.
    pub fn apply_to(self, record: &mut NominatorRecord) {
        record.stash = self.stash;
        record.proxy = self.proxy;
        record.proxy_delay = self.proxy_delay;
        record.reward_destination = self.reward_destination;
        record.bonded = self.bonded;
        record.created_at = self.created_at;
    }
}
