use crate::core::affinity::NEUTRAL;
use crate::core::tags::ParsedTags;
use crate::models::{Event, EventCategory, EventStatus, Sponsor, SponsorshipNeed};

/// Category score when the sponsor declared preferences and the event is not among them
const UNPREFERRED_CATEGORY: f64 = 0.15;

/// Needs score when the sponsor offers support but none of it is needed
const NO_SHARED_NEEDS: f64 = 0.25;

/// Only published events are scored
#[inline]
pub fn is_event_eligible(event: &Event) -> bool {
    event.status() == Some(EventStatus::Published)
}

/// Sponsors are scored once their profile is complete enough
#[inline]
pub fn is_sponsor_eligible(sponsor: &Sponsor, min_profile_completion: u8) -> bool {
    sponsor.completion() >= min_profile_completion
}

/// Score the event category against the sponsor's preferred event types
///
/// Preferences that all failed to parse count as no preferences. Returns `None`
/// only when the sponsor has usable preferences but the event category is unknown.
pub fn category_preference_score(
    category: Option<EventCategory>,
    preferred: &ParsedTags<EventCategory>,
) -> Option<f64> {
    if preferred.tags.is_empty() {
        return Some(NEUTRAL);
    }

    let category = category?;
    if preferred.tags.contains(&category) {
        Some(1.0)
    } else {
        Some(UNPREFERRED_CATEGORY)
    }
}

/// Needs the sponsor can cover, in tag order
pub fn shared_needs(
    needs: &ParsedTags<SponsorshipNeed>,
    offered: &ParsedTags<SponsorshipNeed>,
) -> Vec<SponsorshipNeed> {
    needs.tags.intersection(&offered.tags).copied().collect()
}

/// Score the overlap between an event's needs and a sponsor's offered support
///
/// Either side empty, or left with no usable tags after parsing, is neutral. With `k` of `n` needs covered the score is
/// `0.5 + 0.5 * k / n`, and `0.25` when nothing overlaps, so covering one more
/// need never lowers the score.
pub fn needs_overlap_score(
    needs: &ParsedTags<SponsorshipNeed>,
    offered: &ParsedTags<SponsorshipNeed>,
) -> Option<f64> {
    if needs.tags.is_empty() || offered.tags.is_empty() {
        return Some(NEUTRAL);
    }

    let covered = needs.tags.intersection(&offered.tags).count();
    if covered == 0 {
        return Some(NO_SHARED_NEEDS);
    }

    let total = needs.tags.len() as f64;
    Some(NEUTRAL + NEUTRAL * covered as f64 / total)
}
