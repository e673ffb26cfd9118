// Route exports
pub mod applications;
pub mod matches;

pub use matches::AppState;

use crate::models::{DomainError, ErrorResponse};
use crate::services::{JobError, SourceError, StoreError};
use actix_web::{http::StatusCode, web, HttpResponse};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(applications::configure),
    );
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

pub(crate) fn domain_error_response(err: &DomainError) -> HttpResponse {
    match err {
        DomainError::AlreadyResolved(_) => {
            error_response(StatusCode::CONFLICT, "Invalid transition", err.to_string())
        }
        DomainError::EmptyProposal | DomainError::InvalidResponse => {
            error_response(StatusCode::BAD_REQUEST, "Validation failed", err.to_string())
        }
    }
}

pub(crate) fn store_error_response(err: &StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(what) => {
            error_response(StatusCode::NOT_FOUND, "Not found", format!("{} does not exist", what))
        }
        StoreError::Domain(domain) => domain_error_response(domain),
        StoreError::SqlxError(_) | StoreError::MigrateError(_) => {
            tracing::error!("Store failure: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage error",
                err.to_string(),
            )
        }
    }
}

pub(crate) fn job_error_response(err: &JobError) -> HttpResponse {
    match err {
        JobError::Source(SourceError::NotFound(what)) => {
            error_response(StatusCode::NOT_FOUND, "Not found", format!("{} does not exist", what))
        }
        JobError::Source(source) => {
            tracing::error!("Record source failure: {}", source);
            error_response(StatusCode::BAD_GATEWAY, "Record source error", source.to_string())
        }
    }
}
