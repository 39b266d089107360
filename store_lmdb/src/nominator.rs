//! LMDB implementation of NominatorStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use stakewatch_store::{NominatorStore, StoreError};
use stakewatch_types::NominatorRecord;

use crate::LmdbError;

pub struct LmdbNominatorStore {
    pub(crate) env: Arc<Env>,
    pub(crate) nominators_db: Database<Bytes, Bytes>,
}

impl NominatorStore for LmdbNominatorStore {
    fn get_nominator(&self, address: &str) -> Result<Option<NominatorRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .nominators_db
            .get(&rtxn, address.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let record = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn get_nominator_by_stash(
        &self,
        stash: &str,
    ) -> Result<Option<NominatorRecord>, StoreError> {
        // Nominator sets are small; lookups by stash scan.
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.nominators_db.iter(&rtxn).map_err(LmdbError::from)?;
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            let record: NominatorRecord =
                bincode::deserialize(val).map_err(LmdbError::from)?;
            if record.stash == stash {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    fn put_nominator(&self, record: &NominatorRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.nominators_db
            .put(&mut wtxn, record.address.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_nominator(&self, address: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.nominators_db
            .delete(&mut wtxn, address.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn all_nominators(&self) -> Result<Vec<NominatorRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.nominators_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            let record = bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push(record);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakewatch_types::{NominatorRegistration, Timestamp};

    fn open_test_env() -> crate::LmdbEnvironment {
        let dir = tempfile::tempdir().unwrap();
        crate::LmdbEnvironment::open(dir.path(), 8, 1 << 24).unwrap()
    }

    fn record(address: &str, stash: &str) -> NominatorRecord {
        NominatorRegistration {
            address: address.into(),
            stash: stash.into(),
            proxy: String::new(),
            proxy_delay: 0,
            reward_destination: "Staked".into(),
            bonded: 10_000,
            created_at: Timestamp::new(100),
        }
        .into_new_record()
    }

    #[test]
    fn put_and_get_nominator() {
        let env = open_test_env();
        let store = env.nominator_store();

        assert!(store.get_nominator("addr1").unwrap().is_none());

        store.put_nominator(&record("addr1", "stash1")).unwrap();
        let found = store.get_nominator("addr1").unwrap().unwrap();
        assert_eq!(found.stash, "stash1");
        assert!(found.current.is_empty());
    }

    #[test]
    fn get_by_stash_scans() {
        let env = open_test_env();
        let store = env.nominator_store();

        store.put_nominator(&record("addr1", "stash1")).unwrap();
        store.put_nominator(&record("addr2", "stash2")).unwrap();

        let found = store.get_nominator_by_stash("stash2").unwrap().unwrap();
        assert_eq!(found.address, "addr2");
        assert!(store.get_nominator_by_stash("stash9").unwrap().is_none());
    }

    #[test]
    fn put_overwrites_whole_document() {
        let env = open_test_env();
        let store = env.nominator_store();

        let mut r = record("addr1", "stash1");
        store.put_nominator(&r).unwrap();

        r.bonded = 99;
        r.last_nomination = Timestamp::new(500);
        store.put_nominator(&r).unwrap();

        let found = store.get_nominator("addr1").unwrap().unwrap();
        assert_eq!(found.bonded, 99);
        assert_eq!(found.last_nomination, Timestamp::new(500));
    }

    #[test]
    fn delete_is_idempotent() {
        let env = open_test_env();
        let store = env.nominator_store();

        store.put_nominator(&record("addr1", "stash1")).unwrap();
        store.delete_nominator("addr1").unwrap();
        assert!(store.get_nominator("addr1").unwrap().is_none());

        // Deleting again is not an error.
        store.delete_nominator("addr1").unwrap();
    }

    #[test]
    fn all_nominators_returns_every_document() {
        let env = open_test_env();
        let store = env.nominator_store();

        for i in 0..5 {
            store
                .put_nominator(&record(&format!("addr{i}"), &format!("stash{i}")))
                .unwrap();
        }

        let all = store.all_nominators().unwrap();
        assert_eq!(all.len(), 5);
    }
}
