//! Daily exercise-record submission workflow: eligibility rules, the
//! progressive form state machine, and the commit/revoke service over
//! the record store and messaging gateway ports.

pub mod domain;
pub mod eligibility;
pub mod form;
pub mod gateway;
pub mod index;
pub mod media;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    AttachmentRef, CampaignWindow, DateValidation, DeleteTicket, DurationBucket, NewUploadRecord,
    OwnerId, RecordId, UploadRecord,
};
pub use form::{FormRender, FormSection, FormSession, FormStage, FormStageController};
pub use gateway::{
    FileRef, GatewayError, MessageAnchor, MessageMarker, MessagingGateway, Notice, RetryReason,
    SharedFile, TriggerRef, ViewRef,
};
pub use index::UploadedDateIndex;
pub use media::{MediaDecision, MediaPolicy, MediaProxy};
pub use service::{DeleteError, SubmissionService, SubmitError};
pub use store::{RecordStore, StoreError, StoredUpload};
