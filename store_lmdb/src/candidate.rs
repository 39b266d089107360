//! LMDB implementation of CandidateStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use stakewatch_store::{CandidateStore, StoreError};
use stakewatch_types::{Candidate, EraIndex, Timestamp};

use crate::LmdbError;

pub struct LmdbCandidateStore {
    pub(crate) env: Arc<Env>,
    pub(crate) candidates_db: Database<Bytes, Bytes>,
}

impl LmdbCandidateStore {
    fn read(&self, stash: &str) -> Result<Option<Candidate>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.candidates_db.get(&rtxn, stash.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, candidate: &Candidate) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(candidate)?;
        let mut wtxn = self.env.write_txn()?;
        self.candidates_db
            .put(&mut wtxn, candidate.stash.as_bytes(), &bytes)?;
        wtxn.commit()?;
        Ok(())
    }

    fn scan_by_name(&self, name: &str) -> Result<Option<Candidate>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let iter = self.candidates_db.iter(&rtxn)?;
        for entry in iter {
            let (_, val) = entry?;
            let candidate: Candidate = bincode::deserialize(val)?;
            if candidate.name == name {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

impl CandidateStore for LmdbCandidateStore {
    fn find_by_stash(&self, stash: &str) -> Result<Option<Candidate>, StoreError> {
        Ok(self.read(stash)?)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Candidate>, StoreError> {
        Ok(self.scan_by_name(name)?)
    }

    fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        Ok(self.write(candidate)?)
    }

    fn set_nominated_at(&self, stash: &str, era: EraIndex) -> Result<(), StoreError> {
        // Update-by-query semantics: an unknown stash is a silent no-op.
        if let Some(mut candidate) = self.read(stash)? {
            candidate.nominated_at = Some(era);
            self.write(&candidate)?;
        }
        Ok(())
    }

    fn mark_offline(&self, name: &str, since: Timestamp) -> Result<(), StoreError> {
        if let Some(mut candidate) = self.scan_by_name(name)? {
            // First report wins; a node already marked offline keeps its
            // original offline_since until it comes back.
            if candidate.offline_since == Timestamp::EPOCH {
                candidate.offline_since = since;
                self.write(&candidate)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_env() -> crate::LmdbEnvironment {
        let dir = tempfile::tempdir().unwrap();
        crate::LmdbEnvironment::open(dir.path(), 8, 1 << 24).unwrap()
    }

    #[test]
    fn put_and_find_by_stash() {
        let env = open_test_env();
        let store = env.candidate_store();

        assert!(store.find_by_stash("s1").unwrap().is_none());

        store.put_candidate(&Candidate::new("Val1", "s1")).unwrap();
        let found = store.find_by_stash("s1").unwrap().unwrap();
        assert_eq!(found.name, "Val1");
        assert_eq!(found.nominated_at, None);
    }

    #[test]
    fn find_by_name_scans() {
        let env = open_test_env();
        let store = env.candidate_store();

        store.put_candidate(&Candidate::new("Val1", "s1")).unwrap();
        store.put_candidate(&Candidate::new("Val2", "s2")).unwrap();

        assert_eq!(store.find_by_name("Val2").unwrap().unwrap().stash, "s2");
        assert!(store.find_by_name("Val9").unwrap().is_none());
    }

    #[test]
    fn set_nominated_at_stamps_era() {
        let env = open_test_env();
        let store = env.candidate_store();

        store.put_candidate(&Candidate::new("Val1", "s1")).unwrap();
        store.set_nominated_at("s1", 42).unwrap();

        assert_eq!(store.find_by_stash("s1").unwrap().unwrap().nominated_at, Some(42));
    }

    #[test]
    fn set_nominated_at_unknown_stash_is_noop() {
        let env = open_test_env();
        let store = env.candidate_store();

        // Succeeds without writing anything.
        store.set_nominated_at("missing", 42).unwrap();
        assert!(store.find_by_stash("missing").unwrap().is_none());
    }

    #[test]
    fn mark_offline_first_report_wins() {
        let env = open_test_env();
        let store = env.candidate_store();

        store.put_candidate(&Candidate::new("Val1", "s1")).unwrap();
        store.mark_offline("Val1", Timestamp::new(100)).unwrap();
        store.mark_offline("Val1", Timestamp::new(200)).unwrap();

        let found = store.find_by_stash("s1").unwrap().unwrap();
        assert_eq!(found.offline_since, Timestamp::new(100));
    }
}
