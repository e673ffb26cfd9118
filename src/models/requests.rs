use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Event, Sponsor};

/// Score a pair without persisting it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePreviewRequest {
    pub event: Event,
    pub sponsor: Sponsor,
}

/// Trigger fired when an event is published
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventPublishedRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "event_id", rename = "eventId")]
    pub event_id: String,
}

/// Trigger fired when a sponsor profile changes
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SponsorUpdatedRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "sponsor_id", rename = "sponsorId")]
    pub sponsor_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "event_id", rename = "eventId")]
    pub event_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "sponsor_id", rename = "sponsorId")]
    pub sponsor_id: String,
    #[validate(length(min = 1, max = 5000))]
    #[serde(alias = "proposal_message", rename = "proposalMessage")]
    pub proposal_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondApplicationRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToggleBookmarkRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "sponsor_id", rename = "sponsorId")]
    pub sponsor_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "event_id", rename = "eventId")]
    pub event_id: String,
}

/// Query string selecting records by sponsor or by event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectQuery {
    #[serde(alias = "sponsor_id", rename = "sponsorId")]
    pub sponsor_id: Option<String>,
    #[serde(alias = "event_id", rename = "eventId")]
    pub event_id: Option<String>,
    pub limit: Option<usize>,
}

/// The record a list query is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Sponsor(String),
    Event(String),
}

impl SubjectQuery {
    /// Exactly one of `sponsorId` / `eventId` must be given
    pub fn subject(&self) -> Option<Subject> {
        let non_empty = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).cloned();
        match (non_empty(&self.sponsor_id), non_empty(&self.event_id)) {
            (Some(id), None) => Some(Subject::Sponsor(id)),
            (None, Some(id)) => Some(Subject::Event(id)),
            _ => None,
        }
    }
}
