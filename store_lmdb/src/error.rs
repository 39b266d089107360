use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for LmdbError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<LmdbError> for stakewatch_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::NotFound(key) => stakewatch_store::StoreError::NotFound(key),
            LmdbError::Serialization(msg) => stakewatch_store::StoreError::Serialization(msg),
            other => stakewatch_store::StoreError::Backend(other.to_string()),
        }
    }
}
