//! Nominator document storage.

use stakewatch_types::NominatorRecord;

use crate::StoreError;

/// Single-document storage for nominator records, keyed by controller
/// address. Writes are last-writer-wins on a whole document.
pub trait NominatorStore: Send + Sync {
    fn get_nominator(&self, address: &str) -> Result<Option<NominatorRecord>, StoreError>;

    /// Secondary lookup by stash account.
    fn get_nominator_by_stash(&self, stash: &str)
        -> Result<Option<NominatorRecord>, StoreError>;

    /// Insert or fully replace the document for `record.address`.
    fn put_nominator(&self, record: &NominatorRecord) -> Result<(), StoreError>;

    /// Delete by address. Deleting an absent document is not an error.
    fn delete_nominator(&self, address: &str) -> Result<(), StoreError>;

    fn all_nominators(&self) -> Result<Vec<NominatorRecord>, StoreError>;
}
