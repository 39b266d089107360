//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::{LmdbCandidateStore, LmdbError, LmdbNominatorStore};

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    nominators_db: Database<Bytes, Bytes>,
    candidates_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create data dir: {e}")))?;

        // SAFETY: the environment directory is owned by this process; no
        // other environment is opened on the same path.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let nominators_db = env.create_database(&mut wtxn, Some("nominators"))?;
        let candidates_db = env.create_database(&mut wtxn, Some("candidates"))?;
        wtxn.commit()?;

        Ok(Self {
            env: Arc::new(env),
            nominators_db,
            candidates_db,
        })
    }

    pub fn nominator_store(&self) -> LmdbNominatorStore {
        LmdbNominatorStore {
            env: Arc::clone(&self.env),
            nominators_db: self.nominators_db,
        }
    }

    pub fn candidate_store(&self) -> LmdbCandidateStore {
        LmdbCandidateStore {
            env: Arc::clone(&self.env),
            candidates_db: self.candidates_db,
        }
    }

    /// Flush dirty pages to disk. Called by the shutdown path before the
    /// environment is dropped.
    pub fn sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }
}
