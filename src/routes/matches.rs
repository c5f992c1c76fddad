use actix_web::{web, HttpResponse, Responder};
use crate::models::{FindMatchesRequest, HealthResponse};
use crate::routes::{ApiError, AppState, AuthenticatedUser};

/// Configure health and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.users.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find travel companions endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "destination": "string",
///   "numPeople": 3,
///   "gender": "all"
/// }
/// ```
///
/// Responds with a JSON array of candidates ordered by `similarity_score`.
async fn find_matches(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<FindMatchesRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = state.matcher.build_request(
        req.destination.as_deref(),
        req.num_people.as_ref(),
        req.gender.as_deref(),
    )?;

    tracing::info!(
        "Finding matches for user: {}, destination: {}, count: {}",
        user.email(),
        request.destination,
        request.desired_count
    );

    let result = state
        .matcher
        .find_matches(state.users.as_ref(), &user.0, &request)
        .await?;

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        result.matches.len(),
        user.email(),
        result.total_candidates
    );

    Ok(HttpResponse::Ok().json(result.matches))
}
