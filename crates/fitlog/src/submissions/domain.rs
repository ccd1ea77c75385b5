use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Stable chat-platform user identifier owning a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

/// Opaque identifier assigned by the record store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

/// The inclusive calendar-date range during which submissions are
/// accepted, plus the rolling backdate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rolling_days: u32,
}

/// Fixed set of duration buckets offered by the form's picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    UnderHalfHour,
    HalfHourToForty,
    FortyToFifty,
    FiftyToSixty,
    OverAnHour,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 5] = [
        DurationBucket::UnderHalfHour,
        DurationBucket::HalfHourToForty,
        DurationBucket::FortyToFifty,
        DurationBucket::FiftyToSixty,
        DurationBucket::OverAnHour,
    ];

    /// Human-readable label shown in the picker and stored in the record.
    pub const fn label(self) -> &'static str {
        match self {
            DurationBucket::UnderHalfHour => "Under 30 minutes",
            DurationBucket::HalfHourToForty => "30-40 minutes",
            DurationBucket::FortyToFifty => "40-50 minutes",
            DurationBucket::FiftyToSixty => "50-60 minutes",
            DurationBucket::OverAnHour => "Over an hour",
        }
    }

    /// Stable value string carried inside interactive payloads.
    pub const fn value(self) -> &'static str {
        match self {
            DurationBucket::UnderHalfHour => "under_30",
            DurationBucket::HalfHourToForty => "30_40",
            DurationBucket::FortyToFifty => "40_50",
            DurationBucket::FiftyToSixty => "50_60",
            DurationBucket::OverAnHour => "over_60",
        }
    }

    pub fn from_value(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.value() == raw)
    }
}

/// Image metadata captured when the upload prompt is created; travels
/// inside every interactive payload of the session that follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub file_name: String,
    pub thumbnail_url: String,
    pub source_url: String,
}

/// Outcome vocabulary of every date check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateValidation {
    Valid,
    DuplicateDate,
    OutOfWindow,
}

impl DateValidation {
    pub const fn is_valid(self) -> bool {
        matches!(self, DateValidation::Valid)
    }
}

/// A persisted, owner-scoped exercise-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: RecordId,
    pub owner: OwnerId,
    pub date: NaiveDate,
    pub duration: DurationBucket,
    pub activity_type: String,
    pub comment: Option<String>,
    pub attachment_url: String,
    pub source_url: String,
    pub submitted_at: DateTime<FixedOffset>,
}

/// Record contents before the store has assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUploadRecord {
    pub owner: OwnerId,
    pub date: NaiveDate,
    pub duration: DurationBucket,
    pub activity_type: String,
    pub comment: Option<String>,
    pub attachment_url: String,
    pub source_url: String,
    pub submitted_at: DateTime<FixedOffset>,
}

impl NewUploadRecord {
    pub fn into_record(self, id: RecordId) -> UploadRecord {
        UploadRecord {
            id,
            owner: self.owner,
            date: self.date,
            duration: self.duration,
            activity_type: self.activity_type,
            comment: self.comment,
            attachment_url: self.attachment_url,
            source_url: self.source_url,
            submitted_at: self.submitted_at,
        }
    }
}

/// Payload of the inline delete control: the minimum needed to delete
/// a record without re-fetching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTicket {
    pub record_id: RecordId,
    pub date: NaiveDate,
}
