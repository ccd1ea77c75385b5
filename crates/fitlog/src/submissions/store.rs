use async_trait::async_trait;
use chrono::NaiveDate;

use super::domain::{NewUploadRecord, OwnerId, RecordId};

/// Owner-scoped projection returned by the store listing. Rows whose
/// date column is empty stay representable; the index skips them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub id: RecordId,
    pub date: Option<NaiveDate>,
}

/// Storage abstraction over the external tabular store so the service
/// module can be exercised against in-memory fakes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<StoredUpload>, StoreError>;
    async fn create(&self, record: &NewUploadRecord) -> Result<RecordId, StoreError>;
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store rejected the request: {0}")]
    Rejected(String),
}
