use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store error: {0}")]
    Store(#[from] stakewatch_store::StoreError),

    #[error("storage backend error: {0}")]
    Lmdb(#[from] stakewatch_store_lmdb::LmdbError),

    #[error("feed error: {0}")]
    Feed(#[from] stakewatch_telemetry::FeedError),

    #[error("config error: {0}")]
    Config(String),

    #[error("ops server error: {0}")]
    Ops(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
