//! Sponsor Match - compatibility scoring for student events and corporate sponsors
//!
//! This library scores how well an event fits a sponsor, persists the resulting
//! matches, and tracks sponsor applications and bookmarks.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, Matcher, MatchResult, NEUTRAL_SCORE};
pub use models::{Event, Sponsor, Match, ScoredMatch, ScoringWeights, MatchBand};
pub use services::{ScoringService, ScoringSummary, Store};
