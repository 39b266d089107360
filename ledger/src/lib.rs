//! Nomination ledger.
//!
//! Maintains each nominator's persisted record and its sequence of
//! currently-backed validators. All persistence failures are caught at
//! this boundary: operations surface `false` or an empty collection and
//! log the underlying error, so callers never see storage exceptions.

pub mod nomination;

pub use nomination::NominationLedger;
