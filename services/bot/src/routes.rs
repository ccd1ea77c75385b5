//! Ingress: dispatches chat-platform events to the submission workflow.
//!
//! Every handler follows the same policy: core failures become user
//! notifications through the gateway, delivery failures are logged and
//! dropped, and the platform always gets a 200 acknowledgement. A single
//! failed interaction never affects the next one.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use fitlog::submissions::{
    eligibility, AttachmentRef, DeleteTicket, DurationBucket, FileRef, FormSession, MediaDecision,
    MessageAnchor, MessagingGateway, Notice, OwnerId, RecordStore, RetryReason, SubmitError,
    TriggerRef, ViewRef,
};

use crate::infra::{AppState, BotContext};

pub(crate) const ACTION_OPEN_FORM: &str = "open_submission_form";
pub(crate) const ACTION_PICK_DURATION: &str = "pick_duration";
pub(crate) const ACTION_PICK_DATE: &str = "pick_date";
pub(crate) const ACTION_DELETE_RECORD: &str = "delete_record";

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum InboundEvent {
    FileShared {
        user_id: String,
        channel_id: String,
        file_id: String,
    },
    #[serde(other)]
    Unhandled,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewPayload {
    pub(crate) id: String,
    pub(crate) hash: String,
    pub(crate) private_metadata: String,
    #[serde(default)]
    pub(crate) field_values: HashMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Interaction {
    ActionClicked {
        action_id: String,
        user_id: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        channel_id: Option<String>,
        #[serde(default)]
        message_ts: Option<String>,
        #[serde(default)]
        trigger_id: Option<String>,
        #[serde(default)]
        view: Option<ViewPayload>,
    },
    FormSubmitted {
        user_id: String,
        view: ViewPayload,
    },
    FormClosed {
        user_id: String,
        view: ViewPayload,
    },
    #[serde(other)]
    Unhandled,
}

pub(crate) fn bot_router<S, G>(ctx: Arc<BotContext<S, G>>) -> Router
where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    Router::new()
        .route("/events", post(events_handler::<S, G>))
        .route("/interactions", post(interactions_handler::<S, G>))
        .with_state(ctx)
}

pub(crate) fn with_bot_routes<S, G>(ctx: Arc<BotContext<S, G>>) -> Router
where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    bot_router(ctx)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn is_direct_channel(channel_id: &str) -> bool {
    channel_id.starts_with('D')
}

/// Best-effort delivery; a failed notification is logged and dropped.
async fn notify<G>(gateway: &G, owner: &OwnerId, notice: Notice)
where
    G: MessagingGateway,
{
    if let Err(err) = gateway.post_message(owner, notice).await {
        warn!(owner = %owner.0, error = %err, "notification not delivered");
    }
}

fn parse_session(raw: &str) -> Option<FormSession> {
    match serde_json::from_str(raw) {
        Ok(session) => Some(session),
        Err(err) => {
            warn!(error = %err, "form payload did not carry a readable session");
            None
        }
    }
}

pub(crate) async fn events_handler<S, G>(
    State(ctx): State<Arc<BotContext<S, G>>>,
    Json(event): Json<InboundEvent>,
) -> StatusCode
where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    match event {
        InboundEvent::FileShared {
            user_id,
            channel_id,
            file_id,
        } => {
            if !is_direct_channel(&channel_id) {
                return StatusCode::OK;
            }
            let owner = OwnerId(user_id);

            let file = match ctx.gateway.file_info(&FileRef(file_id)).await {
                Ok(file) => file,
                Err(err) => {
                    warn!(owner = %owner.0, error = %err, "shared file lookup failed");
                    return StatusCode::OK;
                }
            };

            match ctx.media.inspect(&file) {
                MediaDecision::Accept(attachment) => {
                    notify(ctx.gateway.as_ref(), &owner, Notice::UploadPrompt { attachment })
                        .await;
                }
                MediaDecision::Reject => {
                    notify(ctx.gateway.as_ref(), &owner, Notice::NotAnImage).await;
                }
                MediaDecision::Exempt => {}
            }
            StatusCode::OK
        }
        InboundEvent::Unhandled => StatusCode::OK,
    }
}

pub(crate) async fn interactions_handler<S, G>(
    State(ctx): State<Arc<BotContext<S, G>>>,
    Json(interaction): Json<Interaction>,
) -> StatusCode
where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    match interaction {
        Interaction::ActionClicked {
            action_id,
            user_id,
            value,
            channel_id,
            message_ts,
            trigger_id,
            view,
        } => {
            let owner = OwnerId(user_id);
            let anchor = channel_id.zip(message_ts).map(|(channel, ts)| MessageAnchor {
                channel,
                ts,
            });
            match action_id.as_str() {
                ACTION_OPEN_FORM => {
                    handle_open_form(&ctx, &owner, value, trigger_id, anchor).await;
                }
                ACTION_PICK_DURATION => {
                    handle_duration_pick(&ctx, value, view).await;
                }
                ACTION_PICK_DATE => {
                    handle_date_pick(&ctx, &owner, value, view).await;
                }
                ACTION_DELETE_RECORD => {
                    handle_delete(&ctx, &owner, value, anchor).await;
                }
                other => {
                    warn!(action = other, "unrecognized action id");
                }
            }
            StatusCode::OK
        }
        Interaction::FormSubmitted { user_id, view } => {
            handle_form_submit(&ctx, OwnerId(user_id), view).await;
            StatusCode::OK
        }
        Interaction::FormClosed { user_id, view } => {
            let owner = OwnerId(user_id);
            if let Some(session) = parse_session(&view.private_metadata) {
                notify(
                    ctx.gateway.as_ref(),
                    &owner,
                    Notice::FillInAgain {
                        attachment: session.attachment,
                        reason: RetryReason::Cancelled,
                    },
                )
                .await;
            }
            StatusCode::OK
        }
        Interaction::Unhandled => StatusCode::OK,
    }
}

async fn handle_open_form<S, G>(
    ctx: &BotContext<S, G>,
    owner: &OwnerId,
    value: Option<String>,
    trigger_id: Option<String>,
    anchor: Option<MessageAnchor>,
) where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    let attachment: AttachmentRef = match value.as_deref().map(serde_json::from_str) {
        Some(Ok(attachment)) => attachment,
        _ => {
            warn!(owner = %owner.0, "open-form control carried no attachment payload");
            return;
        }
    };
    let Some(trigger) = trigger_id.map(TriggerRef) else {
        warn!(owner = %owner.0, "open-form click arrived without a trigger");
        return;
    };

    if let Some(anchor) = anchor {
        if let Err(err) = ctx
            .gateway
            .update_message(&anchor, fitlog::submissions::MessageMarker::EditorOpened)
            .await
        {
            warn!(owner = %owner.0, error = %err, "editor-opened marker not applied");
        }
    }

    let (session, render) = ctx.controller.open(attachment);
    if let Err(err) = ctx.gateway.open_form(&trigger, &session, render).await {
        warn!(owner = %owner.0, error = %err, "form could not be opened");
    }
}

async fn handle_duration_pick<S, G>(
    ctx: &BotContext<S, G>,
    value: Option<String>,
    view: Option<ViewPayload>,
) where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    let Some(view) = view else {
        warn!("duration pick arrived without its view");
        return;
    };
    let Some(mut session) = parse_session(&view.private_metadata) else {
        return;
    };
    let Some(bucket) = value.as_deref().and_then(DurationBucket::from_value) else {
        warn!("duration pick carried an unknown bucket value");
        return;
    };

    // Single-shot: no re-render once the date step exists.
    if let Some(render) = ctx.controller.select_duration(&mut session, bucket) {
        let view_ref = ViewRef {
            id: view.id,
            hash: view.hash,
        };
        if let Err(err) = ctx.gateway.update_form(&view_ref, &session, render).await {
            warn!(error = %err, "date step could not be revealed");
        }
    }
}

async fn handle_date_pick<S, G>(
    ctx: &BotContext<S, G>,
    owner: &OwnerId,
    value: Option<String>,
    view: Option<ViewPayload>,
) where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    let Some(view) = view else {
        warn!(owner = %owner.0, "date pick arrived without its view");
        return;
    };
    let Some(mut session) = parse_session(&view.private_metadata) else {
        return;
    };
    let candidate = value.unwrap_or_default();

    let render = match ctx.index.used_dates(owner).await {
        Ok(used) => {
            let today = eligibility::campaign_today(ctx.utc_offset_hours);
            ctx.controller
                .select_date(&mut session, &candidate, &used, today)
        }
        Err(err) => {
            warn!(owner = %owner.0, error = %err, "duplicate check unavailable");
            ctx.controller.date_check_unavailable(&mut session)
        }
    };

    let view_ref = ViewRef {
        id: view.id,
        hash: view.hash,
    };
    if let Err(err) = ctx.gateway.update_form(&view_ref, &session, render).await {
        warn!(owner = %owner.0, error = %err, "date verdict could not be rendered");
    }
}

async fn handle_form_submit<S, G>(ctx: &BotContext<S, G>, owner: OwnerId, view: ViewPayload)
where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    let Some(mut session) = parse_session(&view.private_metadata) else {
        return;
    };

    // The session is canonical for the validated steps; the free-text
    // inputs come from the submitted field values.
    session.activity_type = view
        .field_values
        .get("activity_type")
        .and_then(|value| value.clone());
    session.comment = view.field_values.get("comment").and_then(|value| value.clone());

    match ctx.service.submit(&session, &owner).await {
        Ok(_) => {}
        Err(SubmitError::Ineligible(_)) => {
            notify(
                ctx.gateway.as_ref(),
                &owner,
                Notice::FillInAgain {
                    attachment: session.attachment,
                    reason: RetryReason::InvalidDate,
                },
            )
            .await;
        }
        Err(SubmitError::Malformed(field)) => {
            warn!(owner = %owner.0, field, "submission payload incomplete");
            notify(
                ctx.gateway.as_ref(),
                &owner,
                Notice::FillInAgain {
                    attachment: session.attachment,
                    reason: RetryReason::UploadFailed,
                },
            )
            .await;
        }
        Err(SubmitError::Store(err)) => {
            warn!(owner = %owner.0, error = %err, "record could not be stored");
            notify(
                ctx.gateway.as_ref(),
                &owner,
                Notice::FillInAgain {
                    attachment: session.attachment,
                    reason: RetryReason::UploadFailed,
                },
            )
            .await;
        }
    }
}

async fn handle_delete<S, G>(
    ctx: &BotContext<S, G>,
    owner: &OwnerId,
    value: Option<String>,
    anchor: Option<MessageAnchor>,
) where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    let ticket: DeleteTicket = match value.as_deref().map(serde_json::from_str) {
        Some(Ok(ticket)) => ticket,
        _ => {
            warn!(owner = %owner.0, "delete control carried no ticket");
            return;
        }
    };

    if let Err(err) = ctx.service.delete(&ticket, owner, anchor.as_ref()).await {
        warn!(owner = %owner.0, error = %err, "record could not be deleted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryRecordStore, RecordingGateway};
    use chrono::{Duration, NaiveDate};
    use fitlog::config::{CampaignConfig, MediaConfig};
    use fitlog::submissions::{FormStage, MessageMarker, SharedFile};
    use tower::ServiceExt;

    const OFFSET_HOURS: i32 = 8;

    fn campaign() -> CampaignConfig {
        let today = eligibility::campaign_today(OFFSET_HOURS);
        CampaignConfig {
            start_date: today - Duration::days(5),
            end_date: today + Duration::days(5),
            rolling_days: 2,
            utc_offset_hours: OFFSET_HOURS,
        }
    }

    fn media() -> MediaConfig {
        MediaConfig {
            private_host: "files.internal".to_string(),
            proxy_host: Some("proxy.example.com".to_string()),
            exempt_file_ids: vec!["F-HELP".to_string()],
        }
    }

    fn build_context() -> (
        Arc<BotContext<InMemoryRecordStore, RecordingGateway>>,
        Arc<InMemoryRecordStore>,
        Arc<RecordingGateway>,
    ) {
        let store = Arc::new(InMemoryRecordStore::default());
        let gateway = Arc::new(RecordingGateway::default());
        let ctx = Arc::new(BotContext::with_sections(
            store.clone(),
            gateway.clone(),
            &campaign(),
            &media(),
        ));
        (ctx, store, gateway)
    }

    fn image_file(id: &str) -> SharedFile {
        SharedFile {
            id: id.to_string(),
            name: "workout.jpg".to_string(),
            mimetype: "image/jpeg".to_string(),
            original_width: Some(1024),
            thumb_720: Some("https://files.internal/abc/thumb720.jpg".to_string()),
            thumb_480: None,
            thumb_360: None,
            url_private: "https://files.internal/abc/original.jpg".to_string(),
        }
    }

    fn completed_session(date: NaiveDate) -> FormSession {
        FormSession {
            stage: FormStage::Complete,
            attachment: fitlog::submissions::AttachmentRef {
                file_name: "workout.jpg".to_string(),
                thumbnail_url: "https://proxy.example.com/abc/thumb720.jpg".to_string(),
                source_url: "https://proxy.example.com/abc/original.jpg".to_string(),
            },
            duration: Some(DurationBucket::FortyToFifty),
            date: Some(date),
            activity_type: None,
            comment: None,
            last_validation: Some(fitlog::submissions::DateValidation::Valid),
        }
    }

    async fn send(router: Router, path: &str, body: serde_json::Value) -> StatusCode {
        let response = router
            .oneshot(
                axum::http::Request::post(path)
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .expect("route executes");
        response.status()
    }

    fn submit_payload(session: &FormSession, activity: &str) -> serde_json::Value {
        json!({
            "type": "form_submitted",
            "user_id": "U100",
            "view": {
                "id": "V1",
                "hash": "h1",
                "private_metadata": serde_json::to_string(session).unwrap(),
                "field_values": { "activity_type": activity, "comment": "easy pace" },
            },
        })
    }

    #[tokio::test]
    async fn shared_images_prompt_for_details() {
        let (ctx, _store, gateway) = build_context();
        *gateway.file.lock().unwrap() = Some(image_file("F1"));

        let status = send(
            bot_router(ctx),
            "/events",
            json!({
                "type": "file_shared",
                "user_id": "U100",
                "channel_id": "D0200",
                "file_id": "F1",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let notices = gateway.notices();
        assert_eq!(notices.len(), 1);
        match &notices[0].1 {
            Notice::UploadPrompt { attachment } => {
                assert_eq!(
                    attachment.thumbnail_url,
                    "https://proxy.example.com/abc/thumb720.jpg"
                );
            }
            other => panic!("expected upload prompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn files_outside_direct_messages_are_ignored() {
        let (ctx, _store, gateway) = build_context();
        *gateway.file.lock().unwrap() = Some(image_file("F1"));

        send(
            bot_router(ctx),
            "/events",
            json!({
                "type": "file_shared",
                "user_id": "U100",
                "channel_id": "C0300",
                "file_id": "F1",
            }),
        )
        .await;

        assert!(gateway.notices().is_empty());
    }

    #[tokio::test]
    async fn non_image_files_are_warned_unless_exempt() {
        let (ctx, _store, gateway) = build_context();
        let mut pdf = image_file("F2");
        pdf.mimetype = "application/pdf".to_string();
        *gateway.file.lock().unwrap() = Some(pdf);

        send(
            bot_router(ctx.clone()),
            "/events",
            json!({
                "type": "file_shared",
                "user_id": "U100",
                "channel_id": "D0200",
                "file_id": "F2",
            }),
        )
        .await;
        assert!(matches!(gateway.notices()[0].1, Notice::NotAnImage));

        let mut exempt = image_file("F-HELP");
        exempt.mimetype = "application/pdf".to_string();
        *gateway.file.lock().unwrap() = Some(exempt);
        send(
            bot_router(ctx),
            "/events",
            json!({
                "type": "file_shared",
                "user_id": "U100",
                "channel_id": "D0200",
                "file_id": "F-HELP",
            }),
        )
        .await;
        assert_eq!(gateway.notices().len(), 1, "exempt file stays silent");
    }

    #[tokio::test]
    async fn open_form_marks_the_prompt_and_opens_the_first_stage() {
        let (ctx, _store, gateway) = build_context();
        let attachment = fitlog::submissions::AttachmentRef {
            file_name: "workout.jpg".to_string(),
            thumbnail_url: "https://proxy.example.com/abc/thumb720.jpg".to_string(),
            source_url: "https://proxy.example.com/abc/original.jpg".to_string(),
        };

        let status = send(
            bot_router(ctx),
            "/interactions",
            json!({
                "type": "action_clicked",
                "action_id": ACTION_OPEN_FORM,
                "user_id": "U100",
                "value": serde_json::to_string(&attachment).unwrap(),
                "channel_id": "D0200",
                "message_ts": "1628553600.000100",
                "trigger_id": "T1",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            gateway.markers(),
            vec![(
                MessageAnchor {
                    channel: "D0200".to_string(),
                    ts: "1628553600.000100".to_string(),
                },
                MessageMarker::EditorOpened
            )]
        );
        let opened = gateway.opened_forms();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].0.stage, FormStage::AwaitingDuration);
    }

    #[tokio::test]
    async fn duration_pick_reveals_the_date_step_once() {
        let (ctx, _store, gateway) = build_context();
        let session = FormSession::open(completed_session(eligibility::campaign_today(OFFSET_HOURS)).attachment);

        let payload = |metadata: String| {
            json!({
                "type": "action_clicked",
                "action_id": ACTION_PICK_DURATION,
                "user_id": "U100",
                "value": "40_50",
                "view": { "id": "V1", "hash": "h1", "private_metadata": metadata },
            })
        };

        send(
            bot_router(ctx.clone()),
            "/interactions",
            payload(serde_json::to_string(&session).unwrap()),
        )
        .await;
        assert_eq!(gateway.updated_forms().len(), 1);
        let advanced = gateway.updated_forms()[0].1.clone();
        assert_eq!(advanced.stage, FormStage::AwaitingDate);

        // A second pick on the advanced session triggers no re-render.
        send(
            bot_router(ctx),
            "/interactions",
            payload(serde_json::to_string(&advanced).unwrap()),
        )
        .await;
        assert_eq!(gateway.updated_forms().len(), 1);
    }

    #[tokio::test]
    async fn date_pick_renders_a_verdict() {
        let (ctx, _store, gateway) = build_context();
        let mut session = FormSession::open(
            completed_session(eligibility::campaign_today(OFFSET_HOURS)).attachment,
        );
        session.stage = FormStage::AwaitingDate;
        session.duration = Some(DurationBucket::FortyToFifty);
        let today = eligibility::campaign_today(OFFSET_HOURS);

        send(
            bot_router(ctx),
            "/interactions",
            json!({
                "type": "action_clicked",
                "action_id": ACTION_PICK_DATE,
                "user_id": "U100",
                "value": today.format("%Y-%m-%d").to_string(),
                "view": {
                    "id": "V1",
                    "hash": "h1",
                    "private_metadata": serde_json::to_string(&session).unwrap(),
                },
            }),
        )
        .await;

        let updates = gateway.updated_forms();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.stage, FormStage::Complete);
        assert!(updates[0].2.submit_enabled);
    }

    #[tokio::test]
    async fn submitted_forms_are_stored_and_confirmed() {
        let (ctx, store, gateway) = build_context();
        let session = completed_session(eligibility::campaign_today(OFFSET_HOURS));

        let status = send(
            bot_router(ctx),
            "/interactions",
            submit_payload(&session, "Jogging"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1.activity_type, "Jogging");
        assert_eq!(records[0].1.comment.as_deref(), Some("easy pace"));
        assert!(matches!(
            gateway.notices()[0].1,
            Notice::SubmissionAccepted { .. }
        ));
    }

    #[tokio::test]
    async fn duplicate_submissions_reoffer_the_form() {
        let (ctx, store, gateway) = build_context();
        let session = completed_session(eligibility::campaign_today(OFFSET_HOURS));

        send(
            bot_router(ctx.clone()),
            "/interactions",
            submit_payload(&session, "Jogging"),
        )
        .await;
        send(
            bot_router(ctx),
            "/interactions",
            submit_payload(&session, "Jogging"),
        )
        .await;

        assert_eq!(store.records().len(), 1, "second submit must not commit");
        let notices = gateway.notices();
        assert!(matches!(
            notices.last().unwrap().1,
            Notice::FillInAgain {
                reason: RetryReason::InvalidDate,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn closing_the_form_reoffers_the_prompt() {
        let (ctx, _store, gateway) = build_context();
        let session = completed_session(eligibility::campaign_today(OFFSET_HOURS));

        send(
            bot_router(ctx),
            "/interactions",
            json!({
                "type": "form_closed",
                "user_id": "U100",
                "view": {
                    "id": "V1",
                    "hash": "h1",
                    "private_metadata": serde_json::to_string(&session).unwrap(),
                },
            }),
        )
        .await;

        assert!(matches!(
            gateway.notices()[0].1,
            Notice::FillInAgain {
                reason: RetryReason::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn delete_clicks_remove_the_record() {
        let (ctx, store, gateway) = build_context();
        let session = completed_session(eligibility::campaign_today(OFFSET_HOURS));
        send(
            bot_router(ctx.clone()),
            "/interactions",
            submit_payload(&session, "Jogging"),
        )
        .await;
        let record_id = store.records()[0].0.clone();

        let ticket = DeleteTicket {
            record_id,
            date: eligibility::campaign_today(OFFSET_HOURS),
        };
        send(
            bot_router(ctx),
            "/interactions",
            json!({
                "type": "action_clicked",
                "action_id": ACTION_DELETE_RECORD,
                "user_id": "U100",
                "value": serde_json::to_string(&ticket).unwrap(),
                "channel_id": "D0200",
                "message_ts": "1628553600.000100",
            }),
        )
        .await;

        assert!(store.records().is_empty());
        assert!(gateway
            .notices()
            .iter()
            .any(|(_, notice)| matches!(notice, Notice::RecordDeleted { .. })));
        assert!(gateway
            .markers()
            .iter()
            .any(|(_, marker)| *marker == MessageMarker::RecordDeleted));
    }

    #[tokio::test]
    async fn unknown_payloads_are_acknowledged() {
        let (ctx, _store, gateway) = build_context();

        let status = send(
            bot_router(ctx.clone()),
            "/events",
            json!({ "type": "reaction_added" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let status = send(
            bot_router(ctx),
            "/interactions",
            json!({ "type": "shortcut_invoked" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(gateway.notices().is_empty());
    }
}
