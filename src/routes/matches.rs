use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    EventPublishedRequest, HealthResponse, MatchesResponse, ScorePreviewRequest,
    SponsorUpdatedRequest, Subject, SubjectQuery,
};
use crate::routes::{error_response, job_error_response, store_error_response};
use crate::services::{CacheKey, MatchCache, ScoringService, Store};
use std::sync::Arc;

/// Default number of matches returned by a list query
pub const DEFAULT_LIMIT: usize = 20;

/// Upper bound on a list query; also the size of a cached list
pub const MAX_LIMIT: usize = 100;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cache: Option<Arc<dyn MatchCache>>,
    pub scoring: Arc<ScoringService>,
}

/// Configure health, scoring and trigger routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/score", web::post().to(score_preview))
        .route("/matches", web::get().to(list_matches))
        .route("/triggers/event-published", web::post().to(event_published))
        .route("/triggers/sponsor-updated", web::post().to(sponsor_updated))
        .route("/triggers/rescore", web::post().to(rescore_all));
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.store.health_check().await.unwrap_or(false);
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Score preview endpoint
///
/// POST /api/v1/score
///
/// Scores the posted event and sponsor without touching the store.
/// Eligibility rules are not applied.
async fn score_preview(
    state: web::Data<AppState>,
    req: web::Json<ScorePreviewRequest>,
) -> impl Responder {
    let scored = state.scoring.matcher().score_pair(&req.event, &req.sponsor);

    tracing::debug!(
        "Previewed {} <-> {}: {}",
        scored.event_id,
        scored.sponsor_id,
        scored.match_score
    );

    HttpResponse::Ok().json(scored)
}

/// List stored matches
///
/// GET /api/v1/matches?sponsorId={id}&limit=20
/// GET /api/v1/matches?eventId={id}
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<SubjectQuery>,
) -> impl Responder {
    let Some(subject) = query.subject() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing subject",
            "exactly one of sponsorId or eventId is required",
        );
    };

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let scope = match &subject {
        Subject::Sponsor(id) => CacheKey::sponsor_matches(id),
        Subject::Event(id) => CacheKey::event_matches(id),
    };

    // The generation is read before the store so a list built from stale rows
    // lands under a generation the scoring job has already retired
    let cache_key = match &state.cache {
        Some(cache) => match cache.generation(&scope).await {
            Ok(generation) => Some((cache, CacheKey::versioned(&scope, generation))),
            Err(e) => {
                tracing::warn!("Cache generation read failed for {}: {}", scope, e);
                None
            }
        },
        None => None,
    };

    if let Some((cache, key)) = &cache_key {
        match cache.get_matches(key).await {
            Ok(Some(mut matches)) => {
                matches.truncate(limit);
                let total_results = matches.len();
                return HttpResponse::Ok().json(MatchesResponse { matches, total_results });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }
    }

    let result = match &subject {
        Subject::Sponsor(id) => state.store.matches_for_sponsor(id, MAX_LIMIT).await,
        Subject::Event(id) => state.store.matches_for_event(id, MAX_LIMIT).await,
    };

    let mut matches = match result {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!("Failed to list matches for {:?}: {}", subject, e);
            return store_error_response(&e);
        }
    };

    if let Some((cache, key)) = &cache_key {
        if let Err(e) = cache.put_matches(key, &matches).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
    }

    matches.truncate(limit);
    let total_results = matches.len();
    HttpResponse::Ok().json(MatchesResponse { matches, total_results })
}

/// POST /api/v1/triggers/event-published
async fn event_published(
    state: web::Data<AppState>,
    req: web::Json<EventPublishedRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    tracing::info!("Event published trigger: {}", req.event_id);

    match state.scoring.on_event_published(&req.event_id).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => job_error_response(&e),
    }
}

/// POST /api/v1/triggers/sponsor-updated
async fn sponsor_updated(
    state: web::Data<AppState>,
    req: web::Json<SponsorUpdatedRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    tracing::info!("Sponsor updated trigger: {}", req.sponsor_id);

    match state.scoring.on_sponsor_updated(&req.sponsor_id).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => job_error_response(&e),
    }
}

/// POST /api/v1/triggers/rescore
async fn rescore_all(state: web::Data<AppState>) -> impl Responder {
    tracing::info!("Full rescore requested");

    match state.scoring.rescore_all().await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => job_error_response(&e),
    }
}
