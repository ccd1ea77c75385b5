use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{AttachmentRef, OwnerId, UploadRecord};
use super::form::{FormRender, FormSession};

/// Points at a previously posted chat message so it can be rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAnchor {
    pub channel: String,
    pub ts: String,
}

/// Short-lived handle entitling the bot to open a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRef(pub String);

/// Identifies an open form instance for in-place updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRef {
    pub id: String,
    pub hash: String,
}

/// Identifies an uploaded file on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef(pub String);

/// File metadata as reported by the platform; consumed by the media
/// policy to build an `AttachmentRef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    pub id: String,
    pub name: String,
    pub mimetype: String,
    pub original_width: Option<u32>,
    pub thumb_720: Option<String>,
    pub thumb_480: Option<String>,
    pub thumb_360: Option<String>,
    pub url_private: String,
}

/// Why the user is being offered the "fill in details" control again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    InvalidDate,
    UploadFailed,
    Cancelled,
}

/// Typed outbound notification. The gateway adapter owns turning these
/// into platform message payloads; the core never builds block JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    UploadPrompt {
        attachment: AttachmentRef,
    },
    NotAnImage,
    SubmissionAccepted {
        record: UploadRecord,
    },
    FillInAgain {
        attachment: AttachmentRef,
        reason: RetryReason,
    },
    RecordDeleted {
        date: NaiveDate,
    },
}

/// Small status rewrite applied to an existing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageMarker {
    EditorOpened,
    RecordDeleted,
}

/// Outbound seam to the chat platform. Render and update calls are
/// best-effort at the call sites; failures are logged and swallowed.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn post_message(&self, owner: &OwnerId, notice: Notice) -> Result<(), GatewayError>;
    async fn update_message(
        &self,
        anchor: &MessageAnchor,
        marker: MessageMarker,
    ) -> Result<(), GatewayError>;
    async fn open_form(
        &self,
        trigger: &TriggerRef,
        session: &FormSession,
        render: FormRender,
    ) -> Result<(), GatewayError>;
    async fn update_form(
        &self,
        view: &ViewRef,
        session: &FormSession,
        render: FormRender,
    ) -> Result<(), GatewayError>;
    async fn file_info(&self, file: &FileRef) -> Result<SharedFile, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway delivery failed: {0}")]
    Delivery(String),
}
