use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use super::domain::OwnerId;
use super::store::{RecordStore, StoreError};

/// Answers "which dates has this owner already submitted?" by querying
/// the record store. A failed query surfaces as `StoreError::Unavailable`
/// rather than an empty set - treating failure as "no prior dates" would
/// let a duplicate slip through.
pub struct UploadedDateIndex<S> {
    store: Arc<S>,
}

impl<S> UploadedDateIndex<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn used_dates(&self, owner: &OwnerId) -> Result<BTreeSet<NaiveDate>, StoreError> {
        let rows = self.store.list_for_owner(owner).await?;
        Ok(rows.into_iter().filter_map(|row| row.date).collect())
    }
}
