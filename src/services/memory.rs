use crate::models::{
    Application, ApplicationStatus, Bookmark, Match, MatchUpsert, NewApplication,
};
use crate::services::store::{Store, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    matches: HashMap<(String, String), Match>,
    applications: Vec<Application>,
    bookmarks: Vec<Bookmark>,
}

/// In-process store used when no database is configured
///
/// Records live for the lifetime of the process. Applications and bookmarks
/// are kept in insertion order and listed newest first.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches
    pub async fn match_count(&self) -> usize {
        self.tables.read().await.matches.len()
    }
}

fn sorted_matches<'a>(matches: impl Iterator<Item = &'a Match>, limit: usize) -> Vec<Match> {
    let mut matches: Vec<Match> = matches.cloned().collect();
    matches.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| a.event_id.cmp(&b.event_id))
            .then_with(|| a.sponsor_id.cmp(&b.sponsor_id))
    });
    matches.truncate(limit);
    matches
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_match(&self, upsert: &MatchUpsert) -> Result<Match, StoreError> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;

        let record = tables
            .matches
            .entry((upsert.event_id.clone(), upsert.sponsor_id.clone()))
            .and_modify(|existing| {
                existing.match_score = upsert.match_score;
                existing.is_featured = upsert.is_featured;
                existing.updated_at = now;
            })
            .or_insert_with(|| Match {
                id: Uuid::new_v4(),
                event_id: upsert.event_id.clone(),
                sponsor_id: upsert.sponsor_id.clone(),
                match_score: upsert.match_score,
                is_featured: upsert.is_featured,
                created_at: now,
                updated_at: now,
            });

        Ok(record.clone())
    }

    async fn matches_for_sponsor(&self, sponsor_id: &str, limit: usize) -> Result<Vec<Match>, StoreError> {
        let tables = self.tables.read().await;
        Ok(sorted_matches(
            tables.matches.values().filter(|m| m.sponsor_id == sponsor_id),
            limit,
        ))
    }

    async fn matches_for_event(&self, event_id: &str, limit: usize) -> Result<Vec<Match>, StoreError> {
        let tables = self.tables.read().await;
        Ok(sorted_matches(
            tables.matches.values().filter(|m| m.event_id == event_id),
            limit,
        ))
    }

    async fn create_application(&self, application: &NewApplication) -> Result<Application, StoreError> {
        application.validate()?;

        let now = Utc::now();
        let record = Application {
            id: Uuid::new_v4(),
            event_id: application.event_id.clone(),
            sponsor_id: application.sponsor_id.clone(),
            status: ApplicationStatus::Pending,
            proposal_message: application.proposal_message.clone(),
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.applications.push(record.clone());
        Ok(record)
    }

    async fn respond_to_application(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, StoreError> {
        let mut tables = self.tables.write().await;
        let application = tables
            .applications
            .iter_mut()
            .find(|a| a.id == application_id)
            .ok_or_else(|| StoreError::NotFound(format!("application {}", application_id)))?;

        application.status = application.status.respond(status)?;
        application.updated_at = Utc::now();
        Ok(application.clone())
    }

    async fn applications_for_sponsor(&self, sponsor_id: &str) -> Result<Vec<Application>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .rev()
            .filter(|a| a.sponsor_id == sponsor_id)
            .cloned()
            .collect())
    }

    async fn applications_for_event(&self, event_id: &str) -> Result<Vec<Application>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .rev()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn toggle_bookmark(&self, sponsor_id: &str, event_id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        let before = tables.bookmarks.len();
        tables
            .bookmarks
            .retain(|b| !(b.sponsor_id == sponsor_id && b.event_id == event_id));
        if tables.bookmarks.len() != before {
            return Ok(false);
        }

        tables.bookmarks.push(Bookmark {
            id: Uuid::new_v4(),
            sponsor_id: sponsor_id.to_string(),
            event_id: event_id.to_string(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn bookmarks_for_sponsor(&self, sponsor_id: &str) -> Result<Vec<Bookmark>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookmarks
            .iter()
            .rev()
            .filter(|b| b.sponsor_id == sponsor_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
