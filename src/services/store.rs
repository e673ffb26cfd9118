use crate::models::{
    Application, ApplicationStatus, Bookmark, DomainError, Match, MatchUpsert, NewApplication,
};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when reading or writing marketplace records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Persistence for matches, applications and bookmarks
///
/// Match writes are upserts keyed by `(event_id, sponsor_id)`: writing the
/// same pair again replaces the score and featured flag of the existing row.
#[async_trait]
pub trait Store: Send + Sync {
    async fn upsert_match(&self, upsert: &MatchUpsert) -> Result<Match, StoreError>;

    /// Matches for a sponsor, best score first
    async fn matches_for_sponsor(&self, sponsor_id: &str, limit: usize) -> Result<Vec<Match>, StoreError>;

    /// Matches for an event, best score first
    async fn matches_for_event(&self, event_id: &str, limit: usize) -> Result<Vec<Match>, StoreError>;

    async fn create_application(&self, application: &NewApplication) -> Result<Application, StoreError>;

    /// Accept or decline a pending application
    async fn respond_to_application(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, StoreError>;

    /// Applications sent by a sponsor, newest first
    async fn applications_for_sponsor(&self, sponsor_id: &str) -> Result<Vec<Application>, StoreError>;

    /// Applications received by an event, newest first
    async fn applications_for_event(&self, event_id: &str) -> Result<Vec<Application>, StoreError>;

    /// Add the bookmark if absent, remove it if present. Returns whether it now exists.
    async fn toggle_bookmark(&self, sponsor_id: &str, event_id: &str) -> Result<bool, StoreError>;

    /// Bookmarks of a sponsor, newest first
    async fn bookmarks_for_sponsor(&self, sponsor_id: &str) -> Result<Vec<Bookmark>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
