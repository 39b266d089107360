//! LMDB storage backend for the stakewatch service.
//!
//! Implements the `stakewatch-store` traits using the `heed` LMDB
//! bindings. Nominator and candidate documents live in two named
//! databases inside a single environment, serialized with `bincode`.

pub mod candidate;
pub mod environment;
pub mod error;
pub mod nominator;

pub use candidate::LmdbCandidateStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use nominator::LmdbNominatorStore;
