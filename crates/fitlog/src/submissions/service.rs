use std::sync::Arc;

use tracing::warn;

use super::domain::{
    CampaignWindow, DateValidation, DeleteTicket, NewUploadRecord, OwnerId, UploadRecord,
};
use super::eligibility;
use super::form::FormSession;
use super::gateway::{MessageAnchor, MessageMarker, MessagingGateway, Notice};
use super::index::UploadedDateIndex;
use super::store::{RecordStore, StoreError};

/// Commits accepted submissions to the record store and revokes them on
/// request. Both ports are injected so the service runs unchanged
/// against fakes.
pub struct SubmissionService<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    index: UploadedDateIndex<S>,
    window: CampaignWindow,
    utc_offset_hours: i32,
}

impl<S, G> SubmissionService<S, G>
where
    S: RecordStore + 'static,
    G: MessagingGateway + 'static,
{
    pub fn new(
        store: Arc<S>,
        gateway: Arc<G>,
        window: CampaignWindow,
        utc_offset_hours: i32,
    ) -> Self {
        let index = UploadedDateIndex::new(store.clone());
        Self {
            store,
            gateway,
            index,
            window,
            utc_offset_hours,
        }
    }

    /// Commit a completed session as a stored record.
    ///
    /// Eligibility is re-checked here against a freshly queried date set
    /// even though the form already validated the date: time may have
    /// passed and a concurrent submission may have consumed it. The
    /// check and the create are still not atomic against the store, so
    /// the duplicate window is narrowed, not closed.
    pub async fn submit(
        &self,
        session: &FormSession,
        owner: &OwnerId,
    ) -> Result<UploadRecord, SubmitError> {
        let date = session.date.ok_or(SubmitError::Malformed("date"))?;
        let duration = session.duration.ok_or(SubmitError::Malformed("duration"))?;
        let activity_type = session
            .activity_type
            .clone()
            .filter(|value| !value.trim().is_empty())
            .ok_or(SubmitError::Malformed("activity type"))?;

        let today = eligibility::campaign_today(self.utc_offset_hours);
        let used = self.index.used_dates(owner).await?;
        let outcome = eligibility::evaluate(date, &self.window, today, &used);
        if !outcome.is_valid() {
            return Err(SubmitError::Ineligible(outcome));
        }

        let record = NewUploadRecord {
            owner: owner.clone(),
            date,
            duration,
            activity_type,
            comment: session
                .comment
                .clone()
                .filter(|value| !value.trim().is_empty()),
            attachment_url: session.attachment.thumbnail_url.clone(),
            source_url: session.attachment.source_url.clone(),
            submitted_at: eligibility::campaign_now(self.utc_offset_hours),
        };

        let id = self.store.create(&record).await?;
        let stored = record.into_record(id);

        // The record stands even if the confirmation cannot be delivered.
        if let Err(err) = self
            .gateway
            .post_message(
                owner,
                Notice::SubmissionAccepted {
                    record: stored.clone(),
                },
            )
            .await
        {
            warn!(owner = %owner.0, error = %err, "confirmation notice not delivered");
        }

        Ok(stored)
    }

    /// Delete a stored record by its ticket. The delete control was only
    /// ever issued to the record's owner, so no ownership re-check is
    /// performed here.
    pub async fn delete(
        &self,
        ticket: &DeleteTicket,
        owner: &OwnerId,
        anchor: Option<&MessageAnchor>,
    ) -> Result<(), DeleteError> {
        self.store.delete(&ticket.record_id).await?;

        if let Err(err) = self
            .gateway
            .post_message(owner, Notice::RecordDeleted { date: ticket.date })
            .await
        {
            warn!(owner = %owner.0, error = %err, "deletion notice not delivered");
        }

        if let Some(anchor) = anchor {
            if let Err(err) = self
                .gateway
                .update_message(anchor, MessageMarker::RecordDeleted)
                .await
            {
                warn!(owner = %owner.0, error = %err, "deleted marker not applied");
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("submission payload is missing its {0}")]
    Malformed(&'static str),
    #[error("date no longer eligible: {0:?}")]
    Ineligible(DateValidation),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
