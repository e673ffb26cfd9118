// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Application, ApplicationStatus, Bookmark, DomainError, Event, EventCategory, EventStatus,
    Industry, Match, MatchBand, MatchUpsert, NewApplication, ScoreBreakdown, ScoredMatch,
    ScoringWeights, Sponsor, SponsorshipNeed, TagError,
};
pub use requests::{
    CreateApplicationRequest, EventPublishedRequest, RespondApplicationRequest,
    ScorePreviewRequest, SponsorUpdatedRequest, Subject, SubjectQuery, ToggleBookmarkRequest,
};
pub use responses::{
    ApplicationsResponse, BookmarksResponse, ErrorResponse, HealthResponse, MatchesResponse,
    ToggleBookmarkResponse,
};
