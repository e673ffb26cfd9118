use crate::core::{MatchResult, Matcher};
use crate::models::{MatchUpsert, ScoredMatch};
use crate::services::cache::{CacheKey, MatchCache};
use crate::services::retry::{retry_with_backoff, RetryPolicy};
use crate::services::store::Store;
use crate::services::supabase::{RecordSource, SourceError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Record source error: {0}")]
    Source(#[from] SourceError),
}

/// Outcome of one scoring run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringSummary {
    /// Pairs scored and written
    pub scored: usize,
    /// Written pairs at or above the featured threshold
    pub featured: usize,
    /// Candidates excluded by eligibility rules
    pub skipped: usize,
    /// Pairs whose write failed after every retry
    pub failed: usize,
}

impl ScoringSummary {
    fn absorb(&mut self, other: ScoringSummary) {
        self.scored += other.scored;
        self.featured += other.featured;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Scores pairs when events or sponsors change and persists the results
pub struct ScoringService {
    source: Arc<dyn RecordSource>,
    store: Arc<dyn Store>,
    cache: Option<Arc<dyn MatchCache>>,
    matcher: Matcher,
    retry: RetryPolicy,
}

impl ScoringService {
    pub fn new(
        source: Arc<dyn RecordSource>,
        store: Arc<dyn Store>,
        cache: Option<Arc<dyn MatchCache>>,
        matcher: Matcher,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            store,
            cache,
            matcher,
            retry,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Score a newly published event against every eligible sponsor
    pub async fn on_event_published(&self, event_id: &str) -> Result<ScoringSummary, JobError> {
        let event = self.source.get_event(event_id).await?;

        if !self.matcher.is_event_eligible(&event) {
            tracing::info!("Event {} is not published, nothing to score", event_id);
            return Ok(ScoringSummary::default());
        }

        let sponsors = self
            .source
            .list_sponsors(self.matcher.min_profile_completion())
            .await?;

        let result = self
            .matcher
            .rank_sponsors_for_event(&event, &sponsors, usize::MAX);
        let summary = self.persist(result).await;

        tracing::info!(
            "Scored event {}: {} written, {} featured, {} skipped, {} failed",
            event_id,
            summary.scored,
            summary.featured,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    /// Re-score an updated sponsor against every published event
    pub async fn on_sponsor_updated(&self, sponsor_id: &str) -> Result<ScoringSummary, JobError> {
        let sponsor = self.source.get_sponsor(sponsor_id).await?;

        if !self.matcher.is_sponsor_eligible(&sponsor) {
            tracing::info!(
                "Sponsor {} profile is {}% complete, below {}%; not scoring",
                sponsor_id,
                sponsor.completion(),
                self.matcher.min_profile_completion()
            );
            return Ok(ScoringSummary::default());
        }

        let events = self.source.list_published_events().await?;

        let result = self
            .matcher
            .rank_events_for_sponsor(&sponsor, &events, usize::MAX);
        let summary = self.persist(result).await;

        tracing::info!(
            "Scored sponsor {}: {} written, {} featured, {} skipped, {} failed",
            sponsor_id,
            summary.scored,
            summary.featured,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    /// Score every published event against every eligible sponsor
    pub async fn rescore_all(&self) -> Result<ScoringSummary, JobError> {
        let events = self.source.list_published_events().await?;
        let sponsors = self
            .source
            .list_sponsors(self.matcher.min_profile_completion())
            .await?;

        tracing::info!(
            "Rescoring {} events against {} sponsors",
            events.len(),
            sponsors.len()
        );

        let mut summary = ScoringSummary::default();
        for event in &events {
            let result = self
                .matcher
                .rank_sponsors_for_event(event, &sponsors, usize::MAX);
            summary.absorb(self.persist(result).await);
        }

        tracing::info!(
            "Rescore finished: {} written, {} featured, {} skipped, {} failed",
            summary.scored,
            summary.featured,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    /// Upsert every scored pair, then move the cached lists they touched to a new generation
    async fn persist(&self, result: MatchResult) -> ScoringSummary {
        let mut summary = ScoringSummary {
            skipped: result.skipped,
            ..Default::default()
        };

        let mut event_ids = BTreeSet::new();
        let mut sponsor_ids = BTreeSet::new();

        for scored in &result.matches {
            if self.write_match(scored).await {
                summary.scored += 1;
                if scored.is_featured {
                    summary.featured += 1;
                }
                event_ids.insert(scored.event_id.clone());
                sponsor_ids.insert(scored.sponsor_id.clone());
            } else {
                summary.failed += 1;
            }
        }

        self.invalidate(&event_ids, &sponsor_ids).await;
        summary
    }

    async fn write_match(&self, scored: &ScoredMatch) -> bool {
        let upsert = MatchUpsert::from(scored);
        let upsert = &upsert;
        let label = format!("Upsert match {}/{}", scored.event_id, scored.sponsor_id);

        retry_with_backoff(&self.retry, &label, move || self.store.upsert_match(upsert))
            .await
            .is_ok()
    }

    async fn invalidate(&self, event_ids: &BTreeSet<String>, sponsor_ids: &BTreeSet<String>) {
        let Some(cache) = &self.cache else {
            return;
        };

        let scopes: Vec<String> = event_ids
            .iter()
            .map(|id| CacheKey::event_matches(id))
            .chain(sponsor_ids.iter().map(|id| CacheKey::sponsor_matches(id)))
            .collect();

        // Stale lists expire on their own TTL
        if let Err(e) = cache.invalidate_scopes(&scopes).await {
            tracing::warn!("Failed to invalidate {} cached listings: {}", scopes.len(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, Sponsor};
    use crate::services::memory::MemoryStore;
    use async_trait::async_trait;

    struct FixedSource {
        events: Vec<Event>,
        sponsors: Vec<Sponsor>,
    }

    #[async_trait]
    impl RecordSource for FixedSource {
        async fn get_event(&self, event_id: &str) -> Result<Event, SourceError> {
            self.events
                .iter()
                .find(|e| e.id == event_id)
                .cloned()
                .ok_or_else(|| SourceError::NotFound(event_id.to_string()))
        }

        async fn list_published_events(&self) -> Result<Vec<Event>, SourceError> {
            Ok(self
                .events
                .iter()
                .filter(|e| e.status == "published")
                .cloned()
                .collect())
        }

        async fn get_sponsor(&self, sponsor_id: &str) -> Result<Sponsor, SourceError> {
            self.sponsors
                .iter()
                .find(|s| s.id == sponsor_id)
                .cloned()
                .ok_or_else(|| SourceError::NotFound(sponsor_id.to_string()))
        }

        async fn list_sponsors(&self, min_profile_completion: u8) -> Result<Vec<Sponsor>, SourceError> {
            Ok(self
                .sponsors
                .iter()
                .filter(|s| s.completion() >= min_profile_completion)
                .cloned()
                .collect())
        }
    }

    fn event(id: &str, status: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "category": "tech",
            "status": status,
            "sponsorship_needs": ["swag"],
        }))
        .unwrap()
    }

    fn sponsor(id: &str, completion: i32) -> Sponsor {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "industry": "technology",
            "preferred_event_types": ["tech"],
            "offered_support": ["swag"],
            "profile_completion": completion,
        }))
        .unwrap()
    }

    fn service(store: Arc<MemoryStore>) -> ScoringService {
        let source = FixedSource {
            events: vec![event("e1", "published"), event("e2", "draft")],
            sponsors: vec![sponsor("s1", 90), sponsor("s2", 10)],
        };
        ScoringService::new(
            Arc::new(source),
            store,
            None,
            Matcher::default(),
            RetryPolicy::none(),
        )
    }

    #[tokio::test]
    async fn test_event_published_scores_eligible_sponsors() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let summary = service.on_event_published("e1").await.unwrap();
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.featured, 1);
        assert_eq!(summary.failed, 0);

        let matches = store.matches_for_event("e1", 10).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].sponsor_id, "s1");
    }

    #[tokio::test]
    async fn test_draft_event_is_not_scored() {
        let store = Arc::new(MemoryStore::new());
        let summary = service(store.clone()).on_event_published("e2").await.unwrap();

        assert_eq!(summary, ScoringSummary::default());
        assert_eq!(store.match_count().await, 0);
    }

    #[tokio::test]
    async fn test_incomplete_sponsor_is_not_scored() {
        let store = Arc::new(MemoryStore::new());
        let summary = service(store.clone()).on_sponsor_updated("s2").await.unwrap();

        assert_eq!(summary, ScoringSummary::default());
        assert_eq!(store.match_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_event_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let result = service(store).on_event_published("nope").await;
        assert!(matches!(result, Err(JobError::Source(SourceError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_repeated_triggers_do_not_duplicate() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        service.on_event_published("e1").await.unwrap();
        service.on_sponsor_updated("s1").await.unwrap();
        service.rescore_all().await.unwrap();

        assert_eq!(store.match_count().await, 1);
    }
}
