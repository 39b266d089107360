//! Candidate registry access.
//!
//! Candidate documents are owned by the wider pipeline; this service
//! reads them by stash and performs three narrow writes: seeding a
//! candidate, stamping the nomination era, and recording offline
//! bookkeeping for the telemetry reporting path.

use stakewatch_types::{Candidate, EraIndex, Timestamp};

use crate::StoreError;

pub trait CandidateStore: Send + Sync {
    fn find_by_stash(&self, stash: &str) -> Result<Option<Candidate>, StoreError>;

    /// Telemetry nodes are keyed by name, so offline reports resolve
    /// candidates through this lookup.
    fn find_by_name(&self, name: &str) -> Result<Option<Candidate>, StoreError>;

    /// Insert or fully replace a candidate document.
    fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError>;

    /// Stamp `nominated_at` on the candidate with the given stash.
    ///
    /// Mirrors a document-store update-by-query: when no candidate has
    /// that stash, the call succeeds without writing anything.
    fn set_nominated_at(&self, stash: &str, era: EraIndex) -> Result<(), StoreError>;

    /// Record that the named node went offline at `since`. Unknown names
    /// succeed without writing, like `set_nominated_at`.
    fn mark_offline(&self, name: &str, since: Timestamp) -> Result<(), StoreError>;
}
