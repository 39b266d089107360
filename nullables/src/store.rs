//! Nullable store — thread-safe in-memory storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use stakewatch_store::{CandidateStore, NominatorStore, StoreError};
use stakewatch_types::{Candidate, EraIndex, NominatorRecord, Timestamp};

/// An in-memory nominator + candidate store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    nominators: Mutex<HashMap<String, NominatorRecord>>,
    candidates: Mutex<HashMap<String, Candidate>>,
    fail_reads: AtomicU32,
    fail_writes: AtomicU32,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            nominators: Mutex::new(HashMap::new()),
            candidates: Mutex::new(HashMap::new()),
            fail_reads: AtomicU32::new(0),
            fail_writes: AtomicU32::new(0),
        }
    }

    /// Make the next `n` read operations fail with a backend error.
    pub fn fail_next_reads(&self, n: u32) {
        self.fail_reads.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` write operations fail with a backend error.
    pub fn fail_next_writes(&self, n: u32) {
        self.fail_writes.store(n, Ordering::SeqCst);
    }

    fn check(counter: &AtomicU32) -> Result<(), StoreError> {
        if counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Backend("injected failure".into()));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NominatorStore for NullStore {
    fn get_nominator(&self, address: &str) -> Result<Option<NominatorRecord>, StoreError> {
        Self::check(&self.fail_reads)?;
        Ok(self.nominators.lock().unwrap().get(address).cloned())
    }

    fn get_nominator_by_stash(
        &self,
        stash: &str,
    ) -> Result<Option<NominatorRecord>, StoreError> {
        Self::check(&self.fail_reads)?;
        Ok(self
            .nominators
            .lock()
            .unwrap()
            .values()
            .find(|n| n.stash == stash)
            .cloned())
    }

    fn put_nominator(&self, record: &NominatorRecord) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        self.nominators
            .lock()
            .unwrap()
            .insert(record.address.clone(), record.clone());
        Ok(())
    }

    fn delete_nominator(&self, address: &str) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        self.nominators.lock().unwrap().remove(address);
        Ok(())
    }

    fn all_nominators(&self) -> Result<Vec<NominatorRecord>, StoreError> {
        Self::check(&self.fail_reads)?;
        Ok(self.nominators.lock().unwrap().values().cloned().collect())
    }
}

impl CandidateStore for NullStore {
    fn find_by_stash(&self, stash: &str) -> Result<Option<Candidate>, StoreError> {
        Self::check(&self.fail_reads)?;
        Ok(self.candidates.lock().unwrap().get(stash).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Candidate>, StoreError> {
        Self::check(&self.fail_reads)?;
        Ok(self
            .candidates
            .lock()
            .unwrap()
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        self.candidates
            .lock()
            .unwrap()
            .insert(candidate.stash.clone(), candidate.clone());
        Ok(())
    }

    fn set_nominated_at(&self, stash: &str, era: EraIndex) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        if let Some(candidate) = self.candidates.lock().unwrap().get_mut(stash) {
            candidate.nominated_at = Some(era);
        }
        Ok(())
    }

    fn mark_offline(&self, name: &str, since: Timestamp) -> Result<(), StoreError> {
        Self::check(&self.fail_writes)?;
        let mut candidates = self.candidates.lock().unwrap();
        if let Some(candidate) = candidates.values_mut().find(|c| c.name == name) {
            if candidate.offline_since == Timestamp::EPOCH {
                candidate.offline_since = since;
            }
        }
        Ok(())
    }
}
