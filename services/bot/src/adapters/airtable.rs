use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use fitlog::config::StoreConfig;
use fitlog::submissions::{
    eligibility, NewUploadRecord, OwnerId, RecordId, RecordStore, StoreError, StoredUpload,
};

const API_ROOT: &str = "https://api.airtable.com/v0";

/// Record store backed by the Airtable REST API. One table, records
/// filtered by an equality formula on the owner-id column.
pub(crate) struct AirtableStore {
    client: reqwest::Client,
    api_key: String,
    base: String,
    table: String,
}

impl AirtableStore {
    pub(crate) fn new(config: StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key,
            base: config.base,
            table: config.table,
        }
    }

    fn table_url(&self) -> String {
        format!("{API_ROOT}/{}/{}", self.base, self.table)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}", self.table_url(), id.0)
    }

    fn owner_formula(owner: &OwnerId) -> String {
        // Single quotes in the id would otherwise break the formula.
        format!("{{ID}} = '{}'", owner.0.replace('\'', "\\'"))
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<RecordRow>,
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    id: String,
    #[serde(default)]
    fields: RecordFields,
}

#[derive(Debug, Default, Deserialize)]
struct RecordFields {
    #[serde(rename = "Date")]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

async fn read_failure(response: reqwest::Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_server_error() || status.as_u16() == 429 {
        StoreError::Unavailable(format!("{status}: {body}"))
    } else {
        StoreError::Rejected(format!("{status}: {body}"))
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<StoredUpload>, StoreError> {
        let response = self
            .client
            .get(self.table_url())
            .bearer_auth(&self.api_key)
            .query(&[
                ("filterByFormula", Self::owner_formula(owner).as_str()),
                ("fields[]", "ID"),
                ("fields[]", "Date"),
            ])
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let listing: ListResponse = response
            .json()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        Ok(listing
            .records
            .into_iter()
            .map(|row| StoredUpload {
                id: RecordId(row.id),
                date: row
                    .fields
                    .date
                    .as_deref()
                    .and_then(eligibility::parse_submission_date),
            })
            .collect())
    }

    async fn create(&self, record: &NewUploadRecord) -> Result<RecordId, StoreError> {
        let mut fields = json!({
            "ID": record.owner.0,
            "Date": record.date.format("%Y-%m-%d").to_string(),
            "Duration": record.duration.label(),
            "Type": record.activity_type,
            "URL": record.source_url,
            "Timestamp": record.submitted_at.to_rfc3339(),
            "Attachments": [{ "url": record.attachment_url }],
        });
        if let Some(comment) = &record.comment {
            fields["Comment"] = json!(comment);
        }

        let response = self
            .client
            .post(self.table_url())
            .bearer_auth(&self.api_key)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let created: CreateResponse = response
            .json()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(RecordId(created.id))
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.record_url(id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }
        Ok(())
    }
}
