use crate::models::{Event, Sponsor};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when reading records from the marketplace backend
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid service key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read access to the event and sponsor snapshots that get scored
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn get_event(&self, event_id: &str) -> Result<Event, SourceError>;

    /// Published events, newest first
    async fn list_published_events(&self) -> Result<Vec<Event>, SourceError>;

    async fn get_sponsor(&self, sponsor_id: &str) -> Result<Sponsor, SourceError>;

    /// Sponsors whose profile completion is at least `min_profile_completion`
    async fn list_sponsors(&self, min_profile_completion: u8) -> Result<Vec<Sponsor>, SourceError>;
}

/// Table names on the backend
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub events: String,
    pub sponsors: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            events: "events".to_string(),
            sponsors: "sponsors".to_string(),
        }
    }
}

/// REST client for the managed backend's auto-generated table API
///
/// Filters follow the `column=op.value` convention, e.g. `status=eq.published`.
pub struct SupabaseClient {
    base_url: String,
    service_key: String,
    client: Client,
    tables: SupabaseTables,
}

impl SupabaseClient {
    pub fn new(
        base_url: String,
        service_key: String,
        tables: SupabaseTables,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            service_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> String {
        let query = filters
            .iter()
            .map(|(column, filter)| format!("{}={}", column, urlencoding::encode(filter)))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}/rest/v1/{}?select=*&{}",
            self.base_url.trim_end_matches('/'),
            table,
            query
        )
    }

    async fn fetch_rows(&self, url: &str) -> Result<Vec<Value>, SourceError> {
        tracing::debug!("Fetching rows from: {}", url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Backend request failed: {} - {}", status, body);
            return Err(SourceError::ApiError(format!("Request failed: {}", status)));
        }

        let json: Value = response.json().await?;
        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(SourceError::InvalidResponse("Expected an array of rows".into())),
        }
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        kind: &str,
    ) -> Result<T, SourceError> {
        let url = self.table_url(table, &[("id", format!("eq.{}", id)), ("limit", "1".into())]);
        let rows = self.fetch_rows(&url).await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(format!("{} {} not found", kind, id)))?;

        serde_json::from_value(row)
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to parse {}: {}", kind, e)))
    }

    /// Deserialize rows, dropping (and logging) the ones that don't parse
    fn parse_rows<T: DeserializeOwned>(rows: Vec<Value>, kind: &str) -> Vec<T> {
        rows.into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping unparseable {} row: {}", kind, e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl RecordSource for SupabaseClient {
    async fn get_event(&self, event_id: &str) -> Result<Event, SourceError> {
        self.fetch_one(&self.tables.events, event_id, "event").await
    }

    async fn list_published_events(&self) -> Result<Vec<Event>, SourceError> {
        let url = self.table_url(
            &self.tables.events,
            &[
                ("status", "eq.published".into()),
                ("order", "created_at.desc".into()),
            ],
        );
        let rows = self.fetch_rows(&url).await?;
        let events: Vec<Event> = Self::parse_rows(rows, "event");

        tracing::debug!("Fetched {} published events", events.len());
        Ok(events)
    }

    async fn get_sponsor(&self, sponsor_id: &str) -> Result<Sponsor, SourceError> {
        self.fetch_one(&self.tables.sponsors, sponsor_id, "sponsor").await
    }

    async fn list_sponsors(&self, min_profile_completion: u8) -> Result<Vec<Sponsor>, SourceError> {
        let url = self.table_url(
            &self.tables.sponsors,
            &[
                ("profile_completion", format!("gte.{}", min_profile_completion)),
                ("order", "id.asc".into()),
            ],
        );
        let rows = self.fetch_rows(&url).await?;
        let sponsors: Vec<Sponsor> = Self::parse_rows(rows, "sponsor");

        tracing::debug!(
            "Fetched {} sponsors with completion >= {}",
            sponsors.len(),
            min_profile_completion
        );
        Ok(sponsors)
    }
}
