// Core algorithm exports
pub mod affinity;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod tags;

pub use affinity::{audience_fit, industry_affinity, keyword_similarity};
pub use filters::{is_event_eligible, is_sponsor_eligible, needs_overlap_score, category_preference_score};
pub use matcher::{Matcher, MatchResult};
pub use scoring::{calculate_match_score, NEUTRAL_SCORE};
pub use tags::{parse_tags, ParsedTags};
