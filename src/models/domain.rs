use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Event category tag as offered by the event creation form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Tech,
    Culture,
    Sports,
    Workshop,
    Seminar,
    Conference,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 7] = [
        EventCategory::Tech,
        EventCategory::Culture,
        EventCategory::Sports,
        EventCategory::Workshop,
        EventCategory::Seminar,
        EventCategory::Conference,
        EventCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Tech => "tech",
            EventCategory::Culture => "culture",
            EventCategory::Sports => "sports",
            EventCategory::Workshop => "workshop",
            EventCategory::Seminar => "seminar",
            EventCategory::Conference => "conference",
            EventCategory::Other => "other",
        }
    }
}

impl FromStr for EventCategory {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tech" | "technology" => Ok(EventCategory::Tech),
            "culture" | "cultural" => Ok(EventCategory::Culture),
            "sports" | "sport" => Ok(EventCategory::Sports),
            "workshop" => Ok(EventCategory::Workshop),
            "seminar" => Ok(EventCategory::Seminar),
            "conference" => Ok(EventCategory::Conference),
            "other" => Ok(EventCategory::Other),
            _ => Err(TagError::new("event category", s)),
        }
    }
}

/// Sponsor industry tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    Technology,
    Finance,
    Healthcare,
    Education,
    Retail,
    Other,
}

impl FromStr for Industry {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technology" | "tech" => Ok(Industry::Technology),
            "finance" => Ok(Industry::Finance),
            "healthcare" | "health" => Ok(Industry::Healthcare),
            "education" => Ok(Industry::Education),
            "retail" => Ok(Industry::Retail),
            "other" => Ok(Industry::Other),
            _ => Err(TagError::new("industry", s)),
        }
    }
}

/// Kind of support an event asks for, or a sponsor can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsorshipNeed {
    Monetary,
    Product,
    Swag,
    Media,
    Venue,
}

impl SponsorshipNeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            SponsorshipNeed::Monetary => "monetary",
            SponsorshipNeed::Product => "product",
            SponsorshipNeed::Swag => "swag",
            SponsorshipNeed::Media => "media",
            SponsorshipNeed::Venue => "venue",
        }
    }
}

impl FromStr for SponsorshipNeed {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monetary" => Ok(SponsorshipNeed::Monetary),
            "product" => Ok(SponsorshipNeed::Product),
            "swag" => Ok(SponsorshipNeed::Swag),
            "media" => Ok(SponsorshipNeed::Media),
            "venue" => Ok(SponsorshipNeed::Venue),
            _ => Err(TagError::new("sponsorship need", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
}

impl FromStr for EventStatus {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(EventStatus::Draft),
            "published" => Ok(EventStatus::Published),
            "cancelled" | "canceled" => Ok(EventStatus::Cancelled),
            _ => Err(TagError::new("event status", s)),
        }
    }
}

/// An enumerated tag that did not parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} tag: {value:?}")]
pub struct TagError {
    pub kind: &'static str,
    pub value: String,
}

impl TagError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Event row as stored by the marketplace backend
///
/// Tag fields are kept as raw strings: rows written by older clients may carry
/// values outside the enumerations, and scoring skips those instead of
/// rejecting the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub expected_audience: Option<i64>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub sponsorship_needs: Vec<String>,
    #[serde(default = "default_event_status")]
    pub status: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn category(&self) -> Option<EventCategory> {
        self.category.parse().ok()
    }

    pub fn status(&self) -> Option<EventStatus> {
        self.status.parse().ok()
    }

    /// Expected audience, with zero and negative values treated as unknown
    pub fn audience(&self) -> Option<u32> {
        self.expected_audience
            .filter(|n| *n > 0)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
    }
}

fn default_event_status() -> String {
    "draft".to_string()
}

/// Sponsor company profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub preferred_event_types: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub offered_support: Vec<String>,
    #[serde(default)]
    pub audience_min: Option<i64>,
    #[serde(default)]
    pub audience_max: Option<i64>,
    #[serde(default)]
    pub profile_completion: Option<i32>,
}

impl Sponsor {
    pub fn industry(&self) -> Option<Industry> {
        self.industry.as_deref().and_then(|s| s.parse().ok())
    }

    /// Profile completion percentage clamped to 0..=100
    pub fn completion(&self) -> u8 {
        self.profile_completion.unwrap_or(0).clamp(0, 100) as u8
    }

    /// Typical audience range; non-positive bounds count as absent
    pub fn audience_range(&self) -> (Option<u32>, Option<u32>) {
        let bound = |v: Option<i64>| {
            v.filter(|n| *n > 0)
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        };
        (bound(self.audience_min), bound(self.audience_max))
    }
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Persisted compatibility record between one event and one sponsor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub event_id: String,
    pub sponsor_id: String,
    pub match_score: u8,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written when a pair is (re)scored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchUpsert {
    pub event_id: String,
    pub sponsor_id: String,
    pub match_score: u8,
    pub is_featured: bool,
}

impl From<&ScoredMatch> for MatchUpsert {
    fn from(scored: &ScoredMatch) -> Self {
        Self {
            event_id: scored.event_id.clone(),
            sponsor_id: scored.sponsor_id.clone(),
            match_score: scored.match_score,
            is_featured: scored.is_featured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Declined,
}

impl ApplicationStatus {
    /// Organizer response to a pending application
    pub fn respond(self, to: ApplicationStatus) -> Result<ApplicationStatus, DomainError> {
        match (self, to) {
            (_, ApplicationStatus::Pending) => Err(DomainError::InvalidResponse),
            (ApplicationStatus::Pending, next) => Ok(next),
            (current, _) => Err(DomainError::AlreadyResolved(current)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "declined" => Ok(ApplicationStatus::Declined),
            _ => Err(TagError::new("application status", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("proposal message must not be empty")]
    EmptyProposal,

    #[error("application was already {0}")]
    AlreadyResolved(ApplicationStatus),

    #[error("an application can only be accepted or declined")]
    InvalidResponse,
}

/// Sponsor-initiated proposal toward one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub event_id: String,
    pub sponsor_id: String,
    pub status: ApplicationStatus,
    pub proposal_message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated application about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub event_id: String,
    pub sponsor_id: String,
    pub proposal_message: String,
}

impl NewApplication {
    pub fn new(
        event_id: impl Into<String>,
        sponsor_id: impl Into<String>,
        proposal_message: &str,
    ) -> Result<Self, DomainError> {
        let application = Self {
            event_id: event_id.into(),
            sponsor_id: sponsor_id.into(),
            proposal_message: proposal_message.trim().to_string(),
        };
        application.validate()?;
        Ok(application)
    }

    /// Checked again by every store, since the fields are public
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.proposal_message.trim().is_empty() {
            return Err(DomainError::EmptyProposal);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: Uuid,
    pub sponsor_id: String,
    pub event_id: String,
    pub created_at: DateTime<Utc>,
}

/// Presentation band for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchBand {
    Excellent,
    Good,
    Fair,
}

impl MatchBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => MatchBand::Excellent,
            60..=79 => MatchBand::Good,
            _ => MatchBand::Fair,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchBand::Excellent => "Excellent Match",
            MatchBand::Good => "Good Match",
            MatchBand::Fair => "Fair Match",
        }
    }
}

/// Per-dimension scores in 0..=1; `None` means the dimension was not assessable
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub category: Option<f64>,
    pub needs: Option<f64>,
    pub industry: Option<f64>,
    pub audience: Option<f64>,
    pub description: Option<f64>,
}

/// Scored event/sponsor pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "sponsorId")]
    pub sponsor_id: String,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    #[serde(rename = "isFeatured")]
    pub is_featured: bool,
    pub band: MatchBand,
    #[serde(rename = "sharedNeeds")]
    pub shared_needs: Vec<String>,
    pub breakdown: ScoreBreakdown,
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub category: f64,
    pub needs: f64,
    pub industry: f64,
    pub audience: f64,
    pub description: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category: 0.30,
            needs: 0.25,
            industry: 0.20,
            audience: 0.15,
            description: 0.10,
        }
    }
}
