//! Per-nominator nomination state.

use std::sync::Arc;

use stakewatch_store::{CandidateStore, NominatorStore, StoreError};
use stakewatch_types::{
    CurrentTarget, EraIndex, NominatorRecord, NominatorRegistration, Timestamp,
};

/// The nomination ledger, backed by the two document stores.
///
/// Writes are serialized per document by the store (last-writer-wins);
/// no ordering is required or enforced across different nominators.
pub struct NominationLedger {
    nominators: Arc<dyn NominatorStore>,
    candidates: Arc<dyn CandidateStore>,
}

impl NominationLedger {
    pub fn new(nominators: Arc<dyn NominatorStore>, candidates: Arc<dyn CandidateStore>) -> Self {
        Self {
            nominators,
            candidates,
        }
    }

    /// Create or update a nominator.
    ///
    /// A new address gets a fresh record with empty targets and no
    /// nomination timestamp. An existing address has only its
    /// identity/config fields overwritten — `current` and
    /// `last_nomination` are ledger-owned and survive every upsert.
    pub fn upsert_nominator(&self, registration: NominatorRegistration) -> bool {
        let address = registration.address.clone();
        let result: Result<(), StoreError> = (|| {
            match self.nominators.get_nominator(&address)? {
                None => self.nominators.put_nominator(&registration.into_new_record()),
                Some(mut record) => {
                    registration.apply_to(&mut record);
                    self.nominators.put_nominator(&record)
                }
            }
        })();

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(address = %address, "could not upsert nominator: {e}");
                false
            }
        }
    }

    /// Assign a target to a nominator.
    ///
    /// Stamps `nominated_at = era` on the candidate first, then snapshots
    /// the candidate into the nominator's `current` sequence. When the
    /// post-write lookup misses, the era stamp is retained (eventual
    /// consistency — the stores promise no transactions), the append is
    /// skipped, and `false` is returned.
    pub fn set_target(&self, address: &str, target_stash: &str, era: EraIndex) -> bool {
        tracing::info!(address, target = target_stash, era, "setting nomination target");

        if let Err(e) = self.candidates.set_nominated_at(target_stash, era) {
            tracing::warn!(target = target_stash, "could not stamp nomination era: {e}");
            return false;
        }

        let candidate = match self.candidates.find_by_stash(target_stash) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                tracing::warn!(
                    target = target_stash,
                    "candidate lookup returned nothing after era stamp; deleted candidate?"
                );
                return false;
            }
            Err(e) => {
                tracing::warn!(target = target_stash, "candidate lookup failed: {e}");
                return false;
            }
        };

        let snapshot = CurrentTarget {
            name: candidate.name,
            stash: candidate.stash,
            identity: candidate.identity,
        };

        let result: Result<bool, StoreError> = (|| {
            match self.nominators.get_nominator(address)? {
                Some(mut record) => {
                    record.current.push(snapshot);
                    self.nominators.put_nominator(&record)?;
                    Ok(true)
                }
                None => Ok(false),
            }
        })();

        match result {
            Ok(appended) => {
                if !appended {
                    tracing::warn!(address, "no nominator record to append target to");
                }
                appended
            }
            Err(e) => {
                tracing::warn!(address, "could not append target: {e}");
                false
            }
        }
    }

    /// Replace the nominator's targets with an empty sequence. Idempotent;
    /// clearing an absent nominator is a successful no-op.
    pub fn clear_current(&self, address: &str) -> bool {
        tracing::info!(address, "clearing current targets");

        let result: Result<(), StoreError> = (|| {
            if let Some(mut record) = self.nominators.get_nominator(address)? {
                record.current.clear();
                self.nominators.put_nominator(&record)?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(address, "could not clear targets: {e}");
                false
            }
        }
    }

    /// Unconditionally set the last-nomination timestamp. Callers needing
    /// monotonic timestamps must enforce that themselves.
    pub fn set_last_nomination(&self, address: &str, timestamp: Timestamp) -> bool {
        let result: Result<(), StoreError> = (|| {
            if let Some(mut record) = self.nominators.get_nominator(address)? {
                record.last_nomination = timestamp;
                self.nominators.put_nominator(&record)?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(address, "could not set last nomination: {e}");
                false
            }
        }
    }

    /// The nominator's current targets. Returns an empty sequence both
    /// when the nominator is absent and when the lookup fails; the error
    /// case is visible only in the logs.
    pub fn current_targets(&self, address: &str) -> Vec<CurrentTarget> {
        match self.nominators.get_nominator(address) {
            Ok(Some(record)) => record.current,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(address, "could not read current targets: {e}");
                Vec::new()
            }
        }
    }

    /// Delete every stored nominator whose address is not in the active
    /// controller set. Full sweep; re-running with the same set is a
    /// no-op.
    pub fn remove_stale_nominators(&self, active_controllers: &[String]) -> bool {
        let all = match self.nominators.all_nominators() {
            Ok(all) => all,
            Err(e) => {
                tracing::warn!("could not list nominators for staleness sweep: {e}");
                return false;
            }
        };

        let mut ok = true;
        for record in all {
            if !active_controllers.contains(&record.address) {
                tracing::info!(address = %record.address, "removing stale nominator");
                if let Err(e) = self.nominators.delete_nominator(&record.address) {
                    tracing::warn!(address = %record.address, "could not remove stale nominator: {e}");
                    ok = false;
                }
            }
        }
        ok
    }

    pub fn get_nominator(&self, stash: &str) -> Option<NominatorRecord> {
        match self.nominators.get_nominator_by_stash(stash) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(stash, "could not read nominator: {e}");
                None
            }
        }
    }

    pub fn all_nominators(&self) -> Vec<NominatorRecord> {
        match self.nominators.all_nominators() {
            Ok(all) => all,
            Err(e) => {
                tracing::warn!("could not list nominators: {e}");
                Vec::new()
            }
        }
    }
}
