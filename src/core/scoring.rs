use crate::core::affinity::{audience_fit, industry_affinity, keyword_similarity};
use crate::core::filters::{category_preference_score, needs_overlap_score, shared_needs};
use crate::core::tags::parse_tags;
use crate::models::{Event, EventCategory, ScoreBreakdown, ScoringWeights, Sponsor, SponsorshipNeed};

/// Score given when no dimension could be assessed
pub const NEUTRAL_SCORE: u8 = 50;

/// Calculate a match score (0-100) for an event/sponsor pair
///
/// Scoring formula, over the dimensions that can be assessed:
/// score = round(100 * Σ(weight_i * dimension_i) / Σ weight_i)
///
/// | dimension   | default weight | meaning                                  |
/// |-------------|----------------|------------------------------------------|
/// | category    | 0.30           | event category in preferred event types  |
/// | needs       | 0.25           | sponsorship needs covered by the sponsor |
/// | industry    | 0.20           | industry-to-category affinity table      |
/// | audience    | 0.15           | expected audience in the target range    |
/// | description | 0.10           | keyword overlap of the two descriptions  |
///
/// Returns the score, the per-dimension breakdown and the shared needs.
pub fn calculate_match_score(
    event: &Event,
    sponsor: &Sponsor,
    weights: &ScoringWeights,
) -> (u8, ScoreBreakdown, Vec<String>) {
    let category = event.category();

    // Category vs preferred event types
    let preferred = parse_tags::<EventCategory>(&sponsor.preferred_event_types);
    let category_score = category_preference_score(category, &preferred);

    // Sponsorship needs vs offered support
    let needs = parse_tags::<SponsorshipNeed>(&event.sponsorship_needs);
    let offered = parse_tags::<SponsorshipNeed>(&sponsor.offered_support);
    let needs_score = needs_overlap_score(&needs, &offered);
    let shared: Vec<String> = shared_needs(&needs, &offered)
        .iter()
        .map(|n| n.as_str().to_string())
        .collect();

    // Industry affinity, skipped when either tag is missing or malformed
    let industry_score = match (sponsor.industry(), category) {
        (Some(industry), Some(category)) => Some(industry_affinity(industry, category)),
        _ => None,
    };

    // Audience size vs target range
    let (min, max) = sponsor.audience_range();
    let audience_score = Some(audience_fit(event.audience(), min, max));

    let description_score = calculate_description_score(
        event.description.as_deref(),
        sponsor.description.as_deref(),
    );

    let breakdown = ScoreBreakdown {
        category: category_score,
        needs: needs_score,
        industry: industry_score,
        audience: audience_score,
        description: description_score,
    };

    (combine(&breakdown, weights), breakdown, shared)
}

/// Weighted average of the assessable dimensions, scaled to 0-100
pub fn combine(breakdown: &ScoreBreakdown, weights: &ScoringWeights) -> u8 {
    let dimensions = [
        (breakdown.category, weights.category),
        (breakdown.needs, weights.needs),
        (breakdown.industry, weights.industry),
        (breakdown.audience, weights.audience),
        (breakdown.description, weights.description),
    ];

    let (weighted, total_weight) = dimensions
        .iter()
        .filter_map(|(score, weight)| score.map(|s| (s, *weight)))
        .filter(|(s, w)| s.is_finite() && w.is_finite() && *w > 0.0)
        .fold((0.0, 0.0), |(acc, total), (s, w)| {
            (acc + s.clamp(0.0, 1.0) * w, total + w)
        });

    if total_weight <= 0.0 {
        return NEUTRAL_SCORE;
    }

    ((weighted / total_weight) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Calculate description score (0-1)
/// Only assessable when both sides wrote a description
#[inline]
fn calculate_description_score(event: Option<&str>, sponsor: Option<&str>) -> Option<f64> {
    let (event, sponsor) = (event?.trim(), sponsor?.trim());
    if event.is_empty() || sponsor.is_empty() {
        return None;
    }

    let similarity = keyword_similarity(event, sponsor);
    Some(0.25 + 0.75 * (similarity * 3.0).min(1.0))
}
