use async_trait::async_trait;
use serde_json::{json, Value};

use fitlog::config::GatewayConfig;
use fitlog::submissions::{
    AttachmentRef, DeleteTicket, DurationBucket, FileRef, FormRender, FormSection, FormSession,
    GatewayError, MessageAnchor, MessageMarker, MessagingGateway, Notice, OwnerId, RetryReason,
    SharedFile, TriggerRef, ViewRef,
};

use crate::routes::{ACTION_DELETE_RECORD, ACTION_OPEN_FORM, ACTION_PICK_DATE, ACTION_PICK_DURATION};

const API_ROOT: &str = "https://slack.com/api";
const ACCENT_COLOR: &str = "#f2c744";

/// Messaging gateway backed by the Slack Web API. All block payload
/// construction lives here; the core only hands over typed notices and
/// declarative form renders.
pub(crate) struct SlackGateway {
    client: reqwest::Client,
    token: String,
}

impl SlackGateway {
    pub(crate) fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: config.bot_token,
        }
    }

    async fn post_api(&self, method: &str, payload: Value) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(format!("{API_ROOT}/{method}"))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|err| GatewayError::Delivery(err.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|err| GatewayError::Delivery(err.to_string()))?;
        check_ok(method, body)
    }

    async fn get_api(&self, method: &str, query: &[(&str, &str)]) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(format!("{API_ROOT}/{method}"))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|err| GatewayError::Delivery(err.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|err| GatewayError::Delivery(err.to_string()))?;
        check_ok(method, body)
    }
}

fn check_ok(method: &str, body: Value) -> Result<Value, GatewayError> {
    if body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        Ok(body)
    } else {
        let reason = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        Err(GatewayError::Delivery(format!("{method}: {reason}")))
    }
}

#[async_trait]
impl MessagingGateway for SlackGateway {
    async fn post_message(&self, owner: &OwnerId, notice: Notice) -> Result<(), GatewayError> {
        let (text, attachments) = notice_payload(&notice)?;
        let mut payload = json!({
            "channel": owner.0,
            "text": text,
        });
        if let Some(attachments) = attachments {
            payload["attachments"] = attachments;
        }
        self.post_api("chat.postMessage", payload).await.map(|_| ())
    }

    async fn update_message(
        &self,
        anchor: &MessageAnchor,
        marker: MessageMarker,
    ) -> Result<(), GatewayError> {
        let text = match marker {
            MessageMarker::EditorOpened => "Editing window opened",
            MessageMarker::RecordDeleted => "Record deleted",
        };
        let payload = json!({
            "channel": anchor.channel,
            "ts": anchor.ts,
            "text": text,
            "attachments": [{
                "blocks": [context_line(text)],
            }],
        });
        self.post_api("chat.update", payload).await.map(|_| ())
    }

    async fn open_form(
        &self,
        trigger: &TriggerRef,
        session: &FormSession,
        render: FormRender,
    ) -> Result<(), GatewayError> {
        let payload = json!({
            "trigger_id": trigger.0,
            "view": form_view(session, &render)?,
        });
        self.post_api("views.open", payload).await.map(|_| ())
    }

    async fn update_form(
        &self,
        view: &ViewRef,
        session: &FormSession,
        render: FormRender,
    ) -> Result<(), GatewayError> {
        let payload = json!({
            "view_id": view.id,
            "hash": view.hash,
            "view": form_view(session, &render)?,
        });
        self.post_api("views.update", payload).await.map(|_| ())
    }

    async fn file_info(&self, file: &FileRef) -> Result<SharedFile, GatewayError> {
        let body = self.get_api("files.info", &[("file", file.0.as_str())]).await?;
        let file = body
            .get("file")
            .cloned()
            .ok_or_else(|| GatewayError::Delivery("files.info: no file in response".to_string()))?;

        let payload: FilePayload = serde_json::from_value(file)
            .map_err(|err| GatewayError::Delivery(format!("files.info: {err}")))?;
        Ok(SharedFile {
            id: payload.id,
            name: payload.name,
            mimetype: payload.mimetype,
            original_width: payload.original_w,
            thumb_720: payload.thumb_720,
            thumb_480: payload.thumb_480,
            thumb_360: payload.thumb_360,
            url_private: payload.url_private,
        })
    }
}

#[derive(Debug, serde::Deserialize)]
struct FilePayload {
    id: String,
    name: String,
    mimetype: String,
    original_w: Option<u32>,
    thumb_720: Option<String>,
    thumb_480: Option<String>,
    thumb_360: Option<String>,
    url_private: String,
}

fn notice_payload(notice: &Notice) -> Result<(String, Option<Value>), GatewayError> {
    match notice {
        Notice::UploadPrompt { attachment } => Ok((
            "Thanks for joining the daily exercise challenge! Your upload is not finished yet - press \"Fill in details\" to complete it.".to_string(),
            Some(json!([{
                "color": ACCENT_COLOR,
                "blocks": [fill_in_actions(attachment)?],
            }])),
        )),
        Notice::NotAnImage => Ok((
            "Thanks for joining the daily exercise challenge! That file does not look like an image though - please upload a picture with a supported extension.".to_string(),
            None,
        )),
        Notice::SubmissionAccepted { record } => {
            let comment = record.comment.as_deref().unwrap_or("");
            let ticket = DeleteTicket {
                record_id: record.id.clone(),
                date: record.date,
            };
            let summary = format!(
                "*Duration:* {}\n\n*Date:* {}\n\n*Activity:* {}\n\n*Comment:* {}",
                record.duration.label(),
                record.date.format("%Y-%m-%d"),
                record.activity_type,
                comment,
            );
            Ok((
                "Upload complete! Here is what was recorded.".to_string(),
                Some(json!([{
                    "color": ACCENT_COLOR,
                    "blocks": [
                        {
                            "type": "section",
                            "text": mrkdwn(&summary),
                            "accessory": {
                                "type": "image",
                                "image_url": record.attachment_url,
                                "alt_text": "Thumbnail",
                            },
                        },
                        {
                            "type": "actions",
                            "elements": [{
                                "type": "button",
                                "text": plain_text("Delete this record"),
                                "style": "danger",
                                "value": encode(&ticket)?,
                                "action_id": ACTION_DELETE_RECORD,
                                "confirm": {
                                    "title": plain_text("Really delete?"),
                                    "text": mrkdwn(&format!(
                                        "Delete the exercise record for {}.",
                                        record.date.format("%Y-%m-%d")
                                    )),
                                    "confirm": plain_text("Delete"),
                                    "deny": plain_text("Cancel"),
                                },
                            }],
                        },
                    ],
                }])),
            ))
        }
        Notice::FillInAgain { attachment, reason } => {
            let text = match reason {
                RetryReason::InvalidDate => {
                    "The exercise date was not accepted. Please fill in the details again."
                }
                RetryReason::UploadFailed => {
                    "The upload failed. Please fill in the details again."
                }
                RetryReason::Cancelled => {
                    "This upload was cancelled. To record it after all, fill in the details again."
                }
            };
            Ok((
                text.to_string(),
                Some(json!([{
                    "color": ACCENT_COLOR,
                    "blocks": [fill_in_actions(attachment)?],
                }])),
            ))
        }
        Notice::RecordDeleted { date } => Ok((
            format!(
                "The exercise record for {} has been deleted.",
                date.format("%Y-%m-%d")
            ),
            None,
        )),
    }
}

fn form_view(session: &FormSession, render: &FormRender) -> Result<Value, GatewayError> {
    let blocks: Vec<Value> = render.sections.iter().map(section_block).collect();

    let mut view = json!({
        "type": "modal",
        "callback_id": "submission_form",
        "notify_on_close": true,
        "title": plain_text("Log your exercise"),
        "close": plain_text("Cancel"),
        "private_metadata": encode(session)?,
        "blocks": blocks,
    });
    if render.submit_enabled {
        view["submit"] = plain_text("Submit");
    }
    Ok(view)
}

fn section_block(section: &FormSection) -> Value {
    match section {
        FormSection::AttachmentPreview(attachment) => json!({
            "type": "section",
            "block_id": "attachment",
            "text": mrkdwn(&format!("*File*\n{}", attachment.file_name)),
            "accessory": {
                "type": "image",
                "image_url": attachment.thumbnail_url,
                "alt_text": attachment.source_url,
            },
        }),
        FormSection::DurationPicker { selected } => {
            let options: Vec<Value> = DurationBucket::ALL
                .iter()
                .map(|bucket| duration_option(*bucket))
                .collect();
            let mut accessory = json!({
                "type": "static_select",
                "placeholder": plain_text("Select a duration"),
                "options": options,
                "action_id": ACTION_PICK_DURATION,
            });
            if let Some(bucket) = selected {
                accessory["initial_option"] = duration_option(*bucket);
            }
            json!({
                "type": "section",
                "block_id": "duration",
                "text": mrkdwn("*Exercise duration*"),
                "accessory": accessory,
            })
        }
        FormSection::DatePicker { selected } => {
            let mut accessory = json!({
                "type": "datepicker",
                "placeholder": plain_text("Select a date"),
                "action_id": ACTION_PICK_DATE,
            });
            if let Some(date) = selected {
                accessory["initial_date"] = json!(date.format("%Y-%m-%d").to_string());
            }
            json!({
                "type": "section",
                "block_id": "date",
                "text": mrkdwn("*Exercise date*"),
                "accessory": accessory,
            })
        }
        FormSection::DateStatus(text) => context_line(text),
        FormSection::ActivityInput => json!({
            "type": "input",
            "block_id": "activity_type",
            "element": {
                "type": "plain_text_input",
                "action_id": "activity_type_input",
            },
            "label": plain_text("Activity"),
        }),
        FormSection::CommentInput => json!({
            "type": "input",
            "block_id": "comment",
            "optional": true,
            "element": {
                "type": "plain_text_input",
                "action_id": "comment_input",
            },
            "label": plain_text("Comment"),
        }),
    }
}

fn fill_in_actions(attachment: &AttachmentRef) -> Result<Value, GatewayError> {
    Ok(json!({
        "type": "actions",
        "elements": [{
            "type": "button",
            "text": plain_text("Fill in details"),
            "style": "primary",
            "value": encode(attachment)?,
            "action_id": ACTION_OPEN_FORM,
        }],
    }))
}

fn duration_option(bucket: DurationBucket) -> Value {
    json!({
        "text": plain_text(bucket.label()),
        "value": bucket.value(),
    })
}

fn plain_text(text: &str) -> Value {
    json!({ "type": "plain_text", "text": text, "emoji": true })
}

fn mrkdwn(text: &str) -> Value {
    json!({ "type": "mrkdwn", "text": text })
}

fn context_line(text: &str) -> Value {
    json!({ "type": "context", "elements": [plain_text(text)] })
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, GatewayError> {
    let raw = serde_json::to_string(value)
        .map_err(|err| GatewayError::Delivery(format!("payload encoding failed: {err}")))?;
    Ok(Value::String(raw))
}
