use crate::models::{EventCategory, Industry};
use std::collections::BTreeSet;

/// Value used for a dimension that has nothing to compare
pub const NEUTRAL: f64 = 0.5;

/// How well an industry tends to fit an event category (0-1)
///
/// Rows: industry, columns in `EventCategory::ALL` order
/// (tech, culture, sports, workshop, seminar, conference, other).
const AFFINITY_TABLE: [[f64; 7]; 6] = [
    // technology
    [1.00, 0.30, 0.30, 0.90, 0.70, 0.90, NEUTRAL],
    // finance
    [0.60, 0.30, 0.40, 0.70, 0.90, 0.90, NEUTRAL],
    // healthcare
    [0.50, 0.30, 0.90, 0.60, 0.80, 0.70, NEUTRAL],
    // education
    [0.70, 0.70, 0.40, 1.00, 0.90, 0.70, NEUTRAL],
    // retail
    [0.40, 0.90, 0.80, 0.40, 0.30, 0.50, NEUTRAL],
    // other
    [NEUTRAL; 7],
];

/// Look up the industry-to-category affinity
#[inline]
pub fn industry_affinity(industry: Industry, category: EventCategory) -> f64 {
    let row = match industry {
        Industry::Technology => 0,
        Industry::Finance => 1,
        Industry::Healthcare => 2,
        Industry::Education => 3,
        Industry::Retail => 4,
        Industry::Other => 5,
    };
    let col = match category {
        EventCategory::Tech => 0,
        EventCategory::Culture => 1,
        EventCategory::Sports => 2,
        EventCategory::Workshop => 3,
        EventCategory::Seminar => 4,
        EventCategory::Conference => 5,
        EventCategory::Other => 6,
    };
    AFFINITY_TABLE[row][col]
}

/// Score how well an expected audience fits a sponsor's target range (0-1)
///
/// Inside the range scores 1.0. Outside, the score falls off with the log of
/// the ratio to the nearest bound and reaches zero one order of magnitude away.
/// Unknown audience or an open range on both sides is neutral.
pub fn audience_fit(audience: Option<u32>, min: Option<u32>, max: Option<u32>) -> f64 {
    let Some(audience) = audience else {
        return NEUTRAL;
    };

    // Tolerate swapped bounds
    let (low, high) = match (min, max) {
        (None, None) => return NEUTRAL,
        (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
        bounds => bounds,
    };

    let audience = audience as f64;
    let ratio = match (low, high) {
        (Some(low), _) if audience < low as f64 => low as f64 / audience,
        (_, Some(high)) if audience > high as f64 => audience / high as f64,
        _ => return 1.0,
    };

    (1.0 - ratio.ln() / std::f64::consts::LN_10).max(0.0)
}

const STOPWORDS: &[&str] = &[
    "and", "are", "but", "can", "for", "from", "has", "have", "into", "our", "that", "the",
    "their", "this", "with", "will", "you", "your", "who", "all", "its", "was", "were", "they",
    "them", "about", "also", "more", "than", "not", "any", "out", "over",
];

/// Lowercased keywords of at least three characters, stopwords removed
pub fn keywords(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(|w| w.to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Jaccard similarity between the keyword sets of two texts
pub fn keyword_similarity(a: &str, b: &str) -> f64 {
    let a = keywords(a);
    let b = keywords(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let shared = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    shared / union
}
