use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed connection error: {0}")]
    Connection(String),

    #[error("feed subscription error: {0}")]
    Subscribe(String),

    #[error("feed connection closed")]
    Closed,
}
