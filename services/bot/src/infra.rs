use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;

use fitlog::config::{AppConfig, CampaignConfig, MediaConfig};
use fitlog::submissions::{
    FileRef, FormRender, FormSession, FormStageController, GatewayError, MediaPolicy, MediaProxy,
    MessageAnchor, MessageMarker, MessagingGateway, NewUploadRecord, Notice, OwnerId, RecordId,
    RecordStore, SharedFile, StoreError, StoredUpload, SubmissionService, TriggerRef,
    UploadedDateIndex, ViewRef,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the ingress handlers need, wired once at startup.
pub(crate) struct BotContext<S, G> {
    pub(crate) controller: FormStageController,
    pub(crate) service: SubmissionService<S, G>,
    pub(crate) index: UploadedDateIndex<S>,
    pub(crate) gateway: Arc<G>,
    pub(crate) media: MediaPolicy,
    pub(crate) utc_offset_hours: i32,
}

impl<S, G> BotContext<S, G>
where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    pub(crate) fn new(store: Arc<S>, gateway: Arc<G>, config: &AppConfig) -> Self {
        Self::with_sections(store, gateway, &config.campaign, &config.media)
    }

    pub(crate) fn with_sections(
        store: Arc<S>,
        gateway: Arc<G>,
        campaign: &CampaignConfig,
        media: &MediaConfig,
    ) -> Self {
        let window = campaign.window();
        Self {
            controller: FormStageController::new(window),
            service: SubmissionService::new(
                store.clone(),
                gateway.clone(),
                window,
                campaign.utc_offset_hours,
            ),
            index: UploadedDateIndex::new(store),
            gateway,
            media: MediaPolicy::new(
                MediaProxy::new(media.private_host.clone(), media.proxy_host.clone()),
                media.exempt_file_ids.clone(),
            ),
            utc_offset_hours: campaign.utc_offset_hours,
        }
    }
}

/// Store fake backing the demo subcommand and the route tests.
#[derive(Default)]
pub(crate) struct InMemoryRecordStore {
    rows: Mutex<Vec<(RecordId, NewUploadRecord)>>,
    next_id: Mutex<u64>,
}

impl InMemoryRecordStore {
    pub(crate) fn records(&self) -> Vec<(RecordId, NewUploadRecord)> {
        self.rows.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<StoredUpload>, StoreError> {
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
        let mut next = self.next_id.lock().expect("store mutex poisoned");
        *next += 1;
        let id = RecordId(format!("rec{:06}", *next));
        drop(next);
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .push((id.clone(), record.clone()));
        Ok(id)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().expect("store mutex poisoned");
        let before = rows.len();
        rows.retain(|(row_id, _)| row_id != id);
        if rows.len() == before {
            return Err(StoreError::Rejected(format!("no such record {}", id.0)));
        }
        Ok(())
    }
}

/// Gateway fake that records every outbound call instead of delivering
/// it; `file` seeds the `file_info` lookup.
#[derive(Default)]
pub(crate) struct RecordingGateway {
    pub(crate) file: Mutex<Option<SharedFile>>,
    notices: Mutex<Vec<(OwnerId, Notice)>>,
    markers: Mutex<Vec<(MessageAnchor, MessageMarker)>>,
    opened_forms: Mutex<Vec<(FormSession, FormRender)>>,
    updated_forms: Mutex<Vec<(ViewRef, FormSession, FormRender)>>,
}

impl RecordingGateway {
    pub(crate) fn notices(&self) -> Vec<(OwnerId, Notice)> {
        self.notices.lock().expect("gateway mutex poisoned").clone()
    }

    pub(crate) fn markers(&self) -> Vec<(MessageAnchor, MessageMarker)> {
        self.markers.lock().expect("gateway mutex poisoned").clone()
    }

    pub(crate) fn opened_forms(&self) -> Vec<(FormSession, FormRender)> {
        self.opened_forms
            .lock()
            .expect("gateway mutex poisoned")
            .clone()
    }

    pub(crate) fn updated_forms(&self) -> Vec<(ViewRef, FormSession, FormRender)> {
        self.updated_forms
            .lock()
            .expect("gateway mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
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
        session: &FormSession,
        render: FormRender,
    ) -> Result<(), GatewayError> {
        self.opened_forms
            .lock()
            .expect("gateway mutex poisoned")
            .push((session.clone(), render));
        Ok(())
    }

    async fn update_form(
        &self,
        view: &ViewRef,
        session: &FormSession,
        render: FormRender,
    ) -> Result<(), GatewayError> {
        self.updated_forms
            .lock()
            .expect("gateway mutex poisoned")
            .push((view.clone(), session.clone(), render));
        Ok(())
    }

    async fn file_info(&self, file: &FileRef) -> Result<SharedFile, GatewayError> {
        self.file
            .lock()
            .expect("gateway mutex poisoned")
            .clone()
            .filter(|shared| shared.id == file.0)
            .ok_or_else(|| GatewayError::Delivery(format!("unknown file {}", file.0)))
    }
}
