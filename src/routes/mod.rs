// Route exports
pub mod auth;
pub mod matches;
pub mod plans;
pub mod profile;
pub mod uploads;

use crate::core::{MatchError, Matcher};
use crate::models::ErrorResponse;
use crate::services::{
    CacheManager, PlanStore, SessionError, SessionManager, StoreError, UploadError, UploadStore,
    UserStore,
};
use actix_web::{error, http::StatusCode, web, HttpResponse, ResponseError};
use std::sync::Arc;
use thiserror::Error;

pub use auth::AuthenticatedUser;

/// Application state shared across all handlers
///
/// Built once at startup; every collaborator is injected here rather than
/// held in module-level globals.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub plans: Arc<dyn PlanStore>,
    pub cache: Arc<CacheManager>,
    pub sessions: Arc<SessionManager>,
    pub uploads: Arc<UploadStore>,
    pub matcher: Matcher,
    pub bcrypt_cost: u32,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(auth::configure)
            .configure(profile::configure)
            .configure(plans::configure)
            .configure(uploads::configure),
    );
}

/// JSON extractor config rendering malformed bodies as [`ErrorResponse`]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(handle_query_payload_error)
}

/// Raw body limit, sized for image uploads
pub fn payload_config(max_bytes: usize) -> web::PayloadConfig {
    web::PayloadConfig::new(max_bytes)
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::BadRequest {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    ApiError::BadRequest {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
    }
    .into()
}

/// Errors returned by HTTP handlers
///
/// Internal errors keep their diagnostic for the log only; clients get a
/// generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{error}: {message}")]
    BadRequest { error: String, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::BadRequest {
            error: message.clone(),
            message,
        }
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Not logged in".to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error, message) = match self {
            ApiError::BadRequest { error, message } => (error.clone(), message.clone()),
            ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg) => (msg.clone(), msg.clone()),
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    "Internal server error".to_string(),
                    "The request could not be completed".to_string(),
                )
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error,
            message,
            status_code: status.as_u16(),
        })
    }
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Validation(msg) | MatchError::Precondition(msg) => ApiError::bad_request(msg),
            MatchError::Internal(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        tracing::debug!("Session rejected: {}", err);
        ApiError::unauthorized()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::EmptyFilename | UploadError::InvalidExtension => {
                ApiError::bad_request(err.to_string())
            }
            UploadError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            UploadError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::BadRequest {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
        }
    }
}

impl From<error::BlockingError> for ApiError {
    fn from(err: error::BlockingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
