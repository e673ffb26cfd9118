use crate::core::{
    filters::{is_event_eligible, is_sponsor_eligible},
    scoring::calculate_match_score,
};
use crate::models::{Event, MatchBand, ScoredMatch, ScoringWeights, Sponsor};
use std::cmp::Ordering;

/// Default score at which a pair is featured
pub const DEFAULT_FEATURED_THRESHOLD: u8 = 80;

/// Default profile completion a sponsor needs before being matched
pub const DEFAULT_MIN_PROFILE_COMPLETION: u8 = 60;

/// Result of ranking one subject against many candidates
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
    /// Candidates excluded by eligibility rules
    pub skipped: usize,
}

/// Scores event/sponsor pairs and ranks candidates
///
/// # Pipeline Stages
/// 1. Eligibility (published events, sufficiently complete sponsor profiles)
/// 2. Per-pair scoring
/// 3. Ranking by score, ties broken by id so the order is stable
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    featured_threshold: u8,
    min_profile_completion: u8,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            featured_threshold: DEFAULT_FEATURED_THRESHOLD,
            min_profile_completion: DEFAULT_MIN_PROFILE_COMPLETION,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }

    pub fn with_featured_threshold(mut self, threshold: u8) -> Self {
        self.featured_threshold = threshold.min(100);
        self
    }

    pub fn with_min_profile_completion(mut self, completion: u8) -> Self {
        self.min_profile_completion = completion.min(100);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn featured_threshold(&self) -> u8 {
        self.featured_threshold
    }

    pub fn min_profile_completion(&self) -> u8 {
        self.min_profile_completion
    }

    /// Score a single pair. Eligibility is not checked here.
    pub fn score_pair(&self, event: &Event, sponsor: &Sponsor) -> ScoredMatch {
        let (score, breakdown, shared_needs) = calculate_match_score(event, sponsor, &self.weights);

        ScoredMatch {
            event_id: event.id.clone(),
            sponsor_id: sponsor.id.clone(),
            match_score: score,
            is_featured: score >= self.featured_threshold,
            band: MatchBand::from_score(score),
            shared_needs,
            breakdown,
        }
    }

    pub fn is_event_eligible(&self, event: &Event) -> bool {
        is_event_eligible(event)
    }

    pub fn is_sponsor_eligible(&self, sponsor: &Sponsor) -> bool {
        is_sponsor_eligible(sponsor, self.min_profile_completion)
    }

    /// Rank sponsors for one event, best first
    ///
    /// An event that is not published yields no matches and counts every
    /// sponsor as skipped.
    pub fn rank_sponsors_for_event(
        &self,
        event: &Event,
        sponsors: &[Sponsor],
        limit: usize,
    ) -> MatchResult {
        let total_candidates = sponsors.len();

        if !is_event_eligible(event) {
            return MatchResult {
                matches: Vec::new(),
                total_candidates,
                skipped: total_candidates,
            };
        }

        let mut matches: Vec<ScoredMatch> = sponsors
            .iter()
            .filter(|sponsor| is_sponsor_eligible(sponsor, self.min_profile_completion))
            .map(|sponsor| self.score_pair(event, sponsor))
            .collect();
        let skipped = total_candidates - matches.len();

        matches.sort_by(|a, b| by_score_then(a, b, |m| &m.sponsor_id));
        matches.truncate(limit);

        MatchResult {
            matches,
            total_candidates,
            skipped,
        }
    }

    /// Rank published events for one sponsor, best first
    pub fn rank_events_for_sponsor(
        &self,
        sponsor: &Sponsor,
        events: &[Event],
        limit: usize,
    ) -> MatchResult {
        let total_candidates = events.len();

        if !is_sponsor_eligible(sponsor, self.min_profile_completion) {
            return MatchResult {
                matches: Vec::new(),
                total_candidates,
                skipped: total_candidates,
            };
        }

        let mut matches: Vec<ScoredMatch> = events
            .iter()
            .filter(|event| is_event_eligible(event))
            .map(|event| self.score_pair(event, sponsor))
            .collect();
        let skipped = total_candidates - matches.len();

        matches.sort_by(|a, b| by_score_then(a, b, |m| &m.event_id));
        matches.truncate(limit);

        MatchResult {
            matches,
            total_candidates,
            skipped,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Score descending, then the given id ascending
fn by_score_then<F>(a: &ScoredMatch, b: &ScoredMatch, id: F) -> Ordering
where
    F: Fn(&ScoredMatch) -> &String,
{
    b.match_score
        .cmp(&a.match_score)
        .then_with(|| id(a).cmp(id(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_event(id: &str, category: &str, status: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Event {}", id),
            "category": category,
            "sponsorship_needs": ["monetary", "swag"],
            "expected_audience": 250,
            "status": status,
        }))
        .unwrap()
    }

    fn create_sponsor(id: &str, industry: &str, preferred: &[&str], completion: i32) -> Sponsor {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "company_name": format!("Company {}", id),
            "industry": industry,
            "preferred_event_types": preferred,
            "offered_support": ["swag"],
            "audience_min": 100,
            "audience_max": 500,
            "profile_completion": completion,
        }))
        .unwrap()
    }

    #[test]
    fn test_score_pair_featured_flag() {
        let matcher = Matcher::with_default_weights();
        let event = create_event("e1", "tech", "published");
        let sponsor = create_sponsor("s1", "technology", &["tech"], 80);

        let scored = matcher.score_pair(&event, &sponsor);
        assert_eq!(scored.match_score, 93);
        assert!(scored.is_featured);
        assert_eq!(scored.band, MatchBand::Excellent);

        let strict = Matcher::with_default_weights().with_featured_threshold(95);
        let scored = strict.score_pair(&event, &sponsor);
        assert!(!scored.is_featured);
        assert_eq!(scored.band, MatchBand::Excellent);
    }

    #[test]
    fn test_rank_sponsors_filters_incomplete_profiles() {
        let matcher = Matcher::with_default_weights();
        let event = create_event("e1", "tech", "published");

        let sponsors = vec![
            create_sponsor("s1", "technology", &["tech"], 80),
            create_sponsor("s2", "retail", &["culture"], 90),
            create_sponsor("s3", "technology", &["tech"], 20), // Incomplete
        ];

        let result = matcher.rank_sponsors_for_event(&event, &sponsors, 10);

        assert_eq!(result.total_candidates, 3);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].sponsor_id, "s1");
    }

    #[test]
    fn test_unpublished_event_gets_no_matches() {
        let matcher = Matcher::with_default_weights();
        let event = create_event("e1", "tech", "draft");
        let sponsors = vec![create_sponsor("s1", "technology", &["tech"], 80)];

        let result = matcher.rank_sponsors_for_event(&event, &sponsors, 10);
        assert!(result.matches.is_empty());
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_rank_events_sorted_and_limited() {
        let matcher = Matcher::with_default_weights();
        let sponsor = create_sponsor("s1", "technology", &["tech", "workshop"], 80);

        let events = vec![
            create_event("e1", "culture", "published"),
            create_event("e2", "tech", "published"),
            create_event("e3", "workshop", "published"),
            create_event("e4", "tech", "cancelled"),
        ];

        let result = matcher.rank_events_for_sponsor(&sponsor, &events, 2);

        assert_eq!(result.skipped, 1);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].event_id, "e2");
        assert!(result.matches[0].match_score >= result.matches[1].match_score);
    }

    #[test]
    fn test_ties_break_by_id() {
        let matcher = Matcher::with_default_weights();
        let event = create_event("e1", "tech", "published");
        let sponsors = vec![
            create_sponsor("b", "technology", &["tech"], 80),
            create_sponsor("a", "technology", &["tech"], 80),
        ];

        let result = matcher.rank_sponsors_for_event(&event, &sponsors, 10);
        assert_eq!(result.matches[0].sponsor_id, "a");
        assert_eq!(result.matches[1].sponsor_id, "b");
    }
}
