use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use uuid::Uuid;
use crate::models::{
    ApplicationStatus, ApplicationsResponse, BookmarksResponse, CreateApplicationRequest,
    NewApplication, RespondApplicationRequest, Subject, SubjectQuery,
    ToggleBookmarkRequest, ToggleBookmarkResponse,
};
use crate::routes::{domain_error_response, error_response, store_error_response, AppState};

/// Configure application and bookmark routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/applications", web::post().to(create_application))
        .route("/applications", web::get().to(list_applications))
        .route("/applications/{id}/respond", web::post().to(respond_to_application))
        .route("/bookmarks/toggle", web::post().to(toggle_bookmark))
        .route("/bookmarks", web::get().to(list_bookmarks));
}

/// Create application endpoint
///
/// POST /api/v1/applications
///
/// Request body:
/// ```json
/// {
///   "eventId": "string",
///   "sponsorId": "string",
///   "proposalMessage": "string"
/// }
/// ```
async fn create_application(
    state: web::Data<AppState>,
    req: web::Json<CreateApplicationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let application = match NewApplication::new(
        req.event_id.clone(),
        req.sponsor_id.clone(),
        &req.proposal_message,
    ) {
        Ok(application) => application,
        Err(e) => return domain_error_response(&e),
    };

    match state.store.create_application(&application).await {
        Ok(created) => {
            tracing::info!(
                "Sponsor {} applied to event {} ({})",
                created.sponsor_id,
                created.event_id,
                created.id
            );
            HttpResponse::Created().json(created)
        }
        Err(e) => store_error_response(&e),
    }
}

/// Accept or decline an application
///
/// POST /api/v1/applications/{id}/respond
///
/// Request body: `{ "status": "accepted" | "declined" }`
async fn respond_to_application(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RespondApplicationRequest>,
) -> impl Responder {
    let Ok(application_id) = Uuid::parse_str(&path) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid application id",
            format!("{} is not a valid id", path.as_str()),
        );
    };

    let status: ApplicationStatus = match req.status.parse() {
        Ok(status) => status,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid status", e.to_string());
        }
    };

    match state.store.respond_to_application(application_id, status).await {
        Ok(updated) => {
            tracing::info!("Application {} {}", updated.id, updated.status);
            HttpResponse::Ok().json(updated)
        }
        Err(e) => store_error_response(&e),
    }
}

/// GET /api/v1/applications?sponsorId={id} or ?eventId={id}
async fn list_applications(
    state: web::Data<AppState>,
    query: web::Query<SubjectQuery>,
) -> impl Responder {
    let result = match query.subject() {
        Some(Subject::Sponsor(id)) => state.store.applications_for_sponsor(&id).await,
        Some(Subject::Event(id)) => state.store.applications_for_event(&id).await,
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing subject",
                "exactly one of sponsorId or eventId is required",
            );
        }
    };

    match result {
        Ok(applications) => HttpResponse::Ok().json(ApplicationsResponse { applications }),
        Err(e) => store_error_response(&e),
    }
}

/// POST /api/v1/bookmarks/toggle
async fn toggle_bookmark(
    state: web::Data<AppState>,
    req: web::Json<ToggleBookmarkRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    match state.store.toggle_bookmark(&req.sponsor_id, &req.event_id).await {
        Ok(bookmarked) => {
            tracing::debug!(
                "Bookmark {} -> {}: {}",
                req.sponsor_id,
                req.event_id,
                if bookmarked { "added" } else { "removed" }
            );
            HttpResponse::Ok().json(ToggleBookmarkResponse { bookmarked })
        }
        Err(e) => store_error_response(&e),
    }
}

/// GET /api/v1/bookmarks?sponsorId={id}
async fn list_bookmarks(
    state: web::Data<AppState>,
    query: web::Query<SubjectQuery>,
) -> impl Responder {
    let sponsor_id = match query.subject() {
        Some(Subject::Sponsor(id)) => id,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing sponsorId parameter",
                "sponsorId query parameter is required",
            );
        }
    };

    match state.store.bookmarks_for_sponsor(&sponsor_id).await {
        Ok(bookmarks) => HttpResponse::Ok().json(BookmarksResponse { bookmarks }),
        Err(e) => store_error_response(&e),
    }
}
