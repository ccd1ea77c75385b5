use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::submissions::domain::{
    AttachmentRef, CampaignWindow, DateValidation, DurationBucket, NewUploadRecord, OwnerId,
    RecordId,
};
use crate::submissions::eligibility;
use crate::submissions::form::{FormSession, FormStage, FormStageController};
use crate::submissions::gateway::{
    FileRef, GatewayError, MessageAnchor, MessageMarker, MessagingGateway, Notice, SharedFile,
    TriggerRef, ViewRef,
};
use crate::submissions::service::SubmissionService;
use crate::submissions::store::{RecordStore, StoreError, StoredUpload};
use crate::submissions::FormRender;

pub(super) const CAMPAIGN_OFFSET_HOURS: i32 = 8;

pub(super) fn window() -> CampaignWindow {
    CampaignWindow {
        start: NaiveDate::from_ymd_opt(2021, 8, 1).expect("valid date"),
        end: NaiveDate::from_ymd_opt(2021, 8, 31).expect("valid date"),
        rolling_days: 2,
    }
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 8, 10).expect("valid date")
}

/// A window centered on the service's own notion of "today", for tests
/// that exercise the commit-time re-check (which reads the clock).
pub(super) fn live_window() -> CampaignWindow {
    let today = eligibility::campaign_today(CAMPAIGN_OFFSET_HOURS);
    CampaignWindow {
        start: today - Duration::days(5),
        end: today + Duration::days(5),
        rolling_days: 2,
    }
}

pub(super) fn live_today() -> NaiveDate {
    eligibility::campaign_today(CAMPAIGN_OFFSET_HOURS)
}

pub(super) fn owner() -> OwnerId {
    OwnerId("U100".to_string())
}

pub(super) fn attachment() -> AttachmentRef {
    AttachmentRef {
        file_name: "morning-run.jpg".to_string(),
        thumbnail_url: "https://proxy.example.com/abc/thumb720.jpg".to_string(),
        source_url: "https://proxy.example.com/abc/original.jpg".to_string(),
    }
}

pub(super) fn controller() -> FormStageController {
    FormStageController::new(window())
}

/// A session that has walked the whole form and may be submitted.
pub(super) fn completed_session(date: NaiveDate) -> FormSession {
    FormSession {
        stage: FormStage::Complete,
        attachment: attachment(),
        duration: Some(DurationBucket::FortyToFifty),
        date: Some(date),
        activity_type: Some("Jogging".to_string()),
        comment: Some("Riverside loop".to_string()),
        last_validation: Some(DateValidation::Valid),
    }
}

pub(super) fn detail_input_count(render: &FormRender) -> usize {
    render
        .sections
        .iter()
        .filter(|section| matches!(section, crate::submissions::FormSection::ActivityInput))
        .count()
}

pub(super) fn build_service(
    window: CampaignWindow,
) -> (
    SubmissionService<MemoryStore, MemoryGateway>,
    Arc<MemoryStore>,
    Arc<MemoryGateway>,
) {
    let store = Arc::new(MemoryStore::default());
    let gateway = Arc::new(MemoryGateway::default());
    let service = SubmissionService::new(
        store.clone(),
        gateway.clone(),
        window,
        CAMPAIGN_OFFSET_HOURS,
    );
    (service, store, gateway)
}

#[derive(Default)]
pub(super) struct MemoryStore {
    rows: Mutex<Vec<(RecordId, NewUploadRecord)>>,
    next_id: Mutex<u64>,
    calls: Mutex<Vec<&'static str>>,
}

impl MemoryStore {
    pub(super) fn preload(&self, owner: &OwnerId, date: NaiveDate) {
        let record = NewUploadRecord {
            owner: owner.clone(),
            date,
            duration: DurationBucket::UnderHalfHour,
            activity_type: "Stretching".to_string(),
            comment: None,
            attachment_url: "https://proxy.example.com/seed/thumb.jpg".to_string(),
            source_url: "https://proxy.example.com/seed/original.jpg".to_string(),
            submitted_at: eligibility::campaign_now(CAMPAIGN_OFFSET_HOURS),
        };
        let id = self.fresh_id();
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .push((id, record));
    }

    pub(super) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn dates_for(&self, owner: &OwnerId) -> Vec<NaiveDate> {
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|(_, record)| &record.owner == owner)
            .map(|(_, record)| record.date)
            .collect()
    }

    fn fresh_id(&self) -> RecordId {
        let mut next = self.next_id.lock().expect("store mutex poisoned");
        *next += 1;
        RecordId(format!("rec{next:06}"))
    }

    fn note(&self, call: &'static str) {
        self.calls.lock().expect("store mutex poisoned").push(call);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<StoredUpload>, StoreError> {
        self.note("list");
        Ok(self
            .rows
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|(_, record)| &record.owner == owner)
            .map(|(id, record)| StoredUpload {
                id: id.clone(),
                date: Some(record.date),
            })
            .collect())
    }

    async fn create(&self, record: &NewUploadRecord) -> Result<RecordId, StoreError> {
        self.note("create");
        let id = self.fresh_id();
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .push((id.clone(), record.clone()));
        Ok(id)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.note("delete");
        let mut rows = self.rows.lock().expect("store mutex poisoned");
        let before = rows.len();
        rows.retain(|(row_id, _)| row_id != id);
        if rows.len() == before {
            return Err(StoreError::Rejected(format!("no such record {}", id.0)));
        }
        Ok(())
    }
}

/// Returns a fixed row set for any owner; used to probe deduplication.
pub(super) struct FixedRowsStore {
    pub(super) rows: Vec<StoredUpload>,
}

#[async_trait]
impl RecordStore for FixedRowsStore {
    async fn list_for_owner(&self, _owner: &OwnerId) -> Result<Vec<StoredUpload>, StoreError> {
        Ok(self.rows.clone())
    }

    async fn create(&self, _record: &NewUploadRecord) -> Result<RecordId, StoreError> {
        Err(StoreError::Rejected("read only".to_string()))
    }

    async fn delete(&self, _id: &RecordId) -> Result<(), StoreError> {
        Err(StoreError::Rejected("read only".to_string()))
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn list_for_owner(&self, _owner: &OwnerId) -> Result<Vec<StoredUpload>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn create(&self, _record: &NewUploadRecord) -> Result<RecordId, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn delete(&self, _id: &RecordId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

/// Listing works but every mutation is turned away.
pub(super) struct RejectingStore {
    inner: MemoryStore,
}

impl Default for RejectingStore {
    fn default() -> Self {
        Self {
            inner: MemoryStore::default(),
        }
    }
}

#[async_trait]
impl RecordStore for RejectingStore {
    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<StoredUpload>, StoreError> {
        self.inner.list_for_owner(owner).await
    }

    async fn create(&self, _record: &NewUploadRecord) -> Result<RecordId, StoreError> {
        Err(StoreError::Rejected("schema mismatch".to_string()))
    }

    async fn delete(&self, _id: &RecordId) -> Result<(), StoreError> {
        Err(StoreError::Rejected("schema mismatch".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryGateway {
    notices: Mutex<Vec<(OwnerId, Notice)>>,
    markers: Mutex<Vec<(MessageAnchor, MessageMarker)>>,
}

impl MemoryGateway {
    pub(super) fn notices(&self) -> Vec<(OwnerId, Notice)> {
        self.notices.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn markers(&self) -> Vec<(MessageAnchor, MessageMarker)> {
        self.markers.lock().expect("gateway mutex poisoned").clone()
    }
}

#[async_trait]
impl MessagingGateway for MemoryGateway {
    async fn post_message(&self, owner: &OwnerId, notice: Notice) -> Result<(), GatewayError> {
        self.notices
            .lock()
            .expect("gateway mutex poisoned")
            .push((owner.clone(), notice));
        Ok(())
    }

    async fn update_message(
        &self,
        anchor: &MessageAnchor,
        marker: MessageMarker,
    ) -> Result<(), GatewayError> {
        self.markers
            .lock()
            .expect("gateway mutex poisoned")
            .push((anchor.clone(), marker));
        Ok(())
    }

    async fn open_form(
        &self,
        _trigger: &TriggerRef,
        _session: &FormSession,
        _render: FormRender,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn update_form(
        &self,
        _view: &ViewRef,
        _session: &FormSession,
        _render: FormRender,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn file_info(&self, _file: &FileRef) -> Result<SharedFile, GatewayError> {
        Err(GatewayError::Delivery("no file fixture".to_string()))
    }
}

/// Every delivery attempt fails; used to assert the swallow policy.
pub(super) struct FailingGateway;

#[async_trait]
impl MessagingGateway for FailingGateway {
    async fn post_message(&self, _owner: &OwnerId, _notice: Notice) -> Result<(), GatewayError> {
        Err(GatewayError::Delivery("wire down".to_string()))
    }

    async fn update_message(
        &self,
        _anchor: &MessageAnchor,
        _marker: MessageMarker,
    ) -> Result<(), GatewayError> {
        Err(GatewayError::Delivery("wire down".to_string()))
    }

    async fn open_form(
        &self,
        _trigger: &TriggerRef,
        _session: &FormSession,
        _render: FormRender,
    ) -> Result<(), GatewayError> {
        Err(GatewayError::Delivery("wire down".to_string()))
    }

    async fn update_form(
        &self,
        _view: &ViewRef,
        _session: &FormSession,
        _render: FormRender,
    ) -> Result<(), GatewayError> {
        Err(GatewayError::Delivery("wire down".to_string()))
    }

    async fn file_info(&self, _file: &FileRef) -> Result<SharedFile, GatewayError> {
        Err(GatewayError::Delivery("wire down".to_string()))
    }
}
