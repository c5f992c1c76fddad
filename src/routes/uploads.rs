use crate::models::{UploadQuery, UploadResponse};
use crate::routes::{ApiError, AppState, AuthenticatedUser};
use actix_web::{web, HttpResponse};

/// Configure upload routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/uploads", web::post().to(upload));
}

/// Store an image and return its reference path
///
/// POST /api/v1/uploads?filename=beach.jpg
///
/// The request body is the raw file. Bodies above the configured
/// `PayloadConfig` limit are rejected with 413 before reaching the handler.
async fn upload(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let path = state.uploads.save(&query.filename, &body).await?;

    tracing::debug!("{} uploaded {}", user.email(), path);

    Ok(HttpResponse::Created().json(UploadResponse { success: true, path }))
}
