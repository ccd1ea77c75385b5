//! Progressive-disclosure state machine for the submission form.
//!
//! The session has no server-side home: it is serialized into the form
//! payload, round-trips through the chat platform on every interaction,
//! and is reconstructed here. The stage is an explicit tag, and the
//! rendered section list is derived from it, so a section can never be
//! appended twice no matter how often the user re-picks a date.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{AttachmentRef, CampaignWindow, DateValidation, DurationBucket};
use super::eligibility;

/// Where the form currently is in its reveal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStage {
    AwaitingDuration,
    AwaitingDate,
    DatePendingResult,
    Complete,
}

/// Ephemeral state of one in-progress submission. Lives only inside the
/// round-tripped form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSession {
    pub stage: FormStage,
    pub attachment: AttachmentRef,
    pub duration: Option<DurationBucket>,
    pub date: Option<NaiveDate>,
    pub activity_type: Option<String>,
    pub comment: Option<String>,
    pub last_validation: Option<DateValidation>,
}

impl FormSession {
    pub fn open(attachment: AttachmentRef) -> Self {
        Self {
            stage: FormStage::AwaitingDuration,
            attachment,
            duration: None,
            date: None,
            activity_type: None,
            comment: None,
            last_validation: None,
        }
    }

    /// Submission is possible iff the detail step has been revealed and
    /// the most recent date check came back valid.
    pub fn submit_enabled(&self) -> bool {
        self.stage == FormStage::Complete
            && matches!(self.last_validation, Some(DateValidation::Valid))
    }
}

/// One renderable piece of the form. The gateway adapter maps these to
/// platform-specific blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSection {
    AttachmentPreview(AttachmentRef),
    DurationPicker { selected: Option<DurationBucket> },
    DatePicker { selected: Option<NaiveDate> },
    DateStatus(String),
    ActivityInput,
    CommentInput,
}

/// Declarative description of the whole form at its current stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRender {
    pub sections: Vec<FormSection>,
    pub submit_enabled: bool,
}

impl FormRender {
    pub fn has_detail_inputs(&self) -> bool {
        self.sections
            .iter()
            .any(|section| matches!(section, FormSection::ActivityInput))
    }
}

/// Drives stage transitions and emits render instructions.
pub struct FormStageController {
    window: CampaignWindow,
}

impl FormStageController {
    pub fn new(window: CampaignWindow) -> Self {
        Self { window }
    }

    /// Start a fresh session from an attachment prompt.
    pub fn open(&self, attachment: AttachmentRef) -> (FormSession, FormRender) {
        let session = FormSession::open(attachment);
        let render = self.render(&session);
        (session, render)
    }

    /// `AwaitingDuration -> AwaitingDate`. Single-shot: once the date
    /// step exists, re-selecting a duration only updates the stored
    /// value and triggers no re-render.
    pub fn select_duration(
        &self,
        session: &mut FormSession,
        bucket: DurationBucket,
    ) -> Option<FormRender> {
        session.duration = Some(bucket);
        if session.stage != FormStage::AwaitingDuration {
            return None;
        }
        session.stage = FormStage::AwaitingDate;
        Some(self.render(session))
    }

    /// Evaluate a picked date. First `Valid` resolution reveals the
    /// detail inputs and enables submission; later picks only update the
    /// inline status line. Failures gate submission but never remove
    /// sections already revealed.
    pub fn select_date(
        &self,
        session: &mut FormSession,
        candidate: &str,
        used: &BTreeSet<NaiveDate>,
        today: NaiveDate,
    ) -> FormRender {
        if session.stage == FormStage::AwaitingDate {
            session.stage = FormStage::DatePendingResult;
        }

        let outcome = match eligibility::parse_submission_date(candidate) {
            Some(date) => {
                session.date = Some(date);
                eligibility::evaluate(date, &self.window, today, used)
            }
            // Malformed dates fail closed.
            None => {
                session.date = None;
                DateValidation::OutOfWindow
            }
        };
        session.last_validation = Some(outcome);

        if outcome.is_valid() && session.stage == FormStage::DatePendingResult {
            session.stage = FormStage::Complete;
        }

        self.render(session)
    }

    /// The duplicate check could not run because the store query failed.
    /// Clears the last validation so submission stays gated, and shows a
    /// retry status line instead of a verdict.
    pub fn date_check_unavailable(&self, session: &mut FormSession) -> FormRender {
        session.last_validation = None;
        self.render_with_status(
            session,
            Some("Could not check your previous uploads right now. Please pick the date again.".to_string()),
        )
    }

    /// Project the session into its full section list.
    pub fn render(&self, session: &FormSession) -> FormRender {
        self.render_with_status(session, None)
    }

    fn render_with_status(&self, session: &FormSession, status: Option<String>) -> FormRender {
        let mut sections = vec![
            FormSection::AttachmentPreview(session.attachment.clone()),
            FormSection::DurationPicker {
                selected: session.duration,
            },
        ];

        if session.stage != FormStage::AwaitingDuration {
            sections.push(FormSection::DatePicker {
                selected: session.date,
            });
            let line = status.unwrap_or_else(|| self.status_line(session));
            sections.push(FormSection::DateStatus(line));
        }

        if session.stage == FormStage::Complete {
            sections.push(FormSection::ActivityInput);
            sections.push(FormSection::CommentInput);
        }

        FormRender {
            submit_enabled: session.submit_enabled(),
            sections,
        }
    }

    fn status_line(&self, session: &FormSession) -> String {
        match session.last_validation {
            None => self.window_note(),
            Some(DateValidation::Valid) => "Exercise date accepted.".to_string(),
            Some(DateValidation::DuplicateDate) => {
                "That date already has an upload. Each date can only be submitted once.".to_string()
            }
            Some(DateValidation::OutOfWindow) => format!(
                "That date is not accepted. Only today back through the previous {} day(s), inside the campaign period, can be used.",
                self.window.rolling_days
            ),
        }
    }

    /// Explanatory note shown under the date picker before any pick.
    fn window_note(&self) -> String {
        format!(
            "Pick a date between {} and {}. The same date cannot be uploaded twice, and only today back through the previous {} day(s) is accepted.",
            self.window.start.format("%-m/%-d"),
            self.window.end.format("%-m/%-d"),
            self.window.rolling_days
        )
    }
}
