//! Abstract persistence traits for the stakewatch service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits; the
//! nomination ledger in particular never sees a concrete backend.
//!
//! All operations are single-document reads and writes — no
//! cross-document transactions are promised, and callers must not rely
//! on any ordering across different documents.

pub mod candidate;
pub mod error;
pub mod nominator;

pub use candidate::CandidateStore;
pub use error::StoreError;
pub use nominator::NominatorStore;
