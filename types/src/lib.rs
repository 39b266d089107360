//! Fundamental types shared across the stakewatch workspace.
//!
//! Everything here is plain data: account records, candidate snapshots,
//! and the timestamp/era units used to stamp nomination events. Domain
//! logic lives in the `ledger` and `telemetry` crates.

pub mod candidate;
pub mod nominator;
pub mod time;

pub use candidate::{Candidate, Identity};
pub use nominator::{CurrentTarget, NominatorRecord, NominatorRegistration};
pub use time::Timestamp;

/// Chain-native staking epoch index. Nomination and reward events are
/// stamped with the era they occurred in.
pub type EraIndex = u32;
