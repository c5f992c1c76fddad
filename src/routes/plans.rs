use crate::models::{CreatePlanRequest, CreatePlanResponse, NewPlan, TravelPlan};
use crate::routes::{ApiError, AppState, AuthenticatedUser};
use crate::services::CacheKey;
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure travel plan routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/plans", web::get().to(list_plans))
        .route("/plans", web::post().to(create_plan))
        .route("/plans/{id}", web::get().to(get_plan));
}

/// List all plans, newest first
///
/// Served from the cache when possible; every insert invalidates the
/// cached listing.
async fn list_plans(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let cache_key = CacheKey::plans();

    match state.cache.get_versioned::<Vec<TravelPlan>>(&cache_key).await {
        Ok(Some(plans)) => return Ok(HttpResponse::Ok().json(plans)),
        Ok(None) => {}
        Err(e) => tracing::warn!("Plan listing cache lookup failed: {}", e),
    }

    // Read before the store so an insert racing this request wins
    let generation = state.cache.generation(&cache_key).await;

    let plans = state.plans.list_plans().await?;

    match generation {
        Ok(generation) => {
            if let Err(e) = state.cache.set_versioned(&cache_key, generation, &plans).await {
                tracing::warn!("Failed to cache plan listing: {}", e);
            }
        }
        Err(e) => tracing::warn!("Plan listing generation unavailable: {}", e),
    }

    Ok(HttpResponse::Ok().json(plans))
}

/// Create a travel plan
///
/// POST /api/v1/plans
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "location": "string",
///   "startDate": "string",
///   "endDate": "string",
///   "description": "string",
///   "imageUrl": "string"
/// }
/// ```
///
/// `imageUrl` is either an external URL or a path returned by the upload
/// endpoint.
async fn create_plan(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreatePlanRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let req = req.into_inner();
    let image_url = match req.image_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => url,
        None => return Err(ApiError::bad_request("No image URL provided")),
    };

    let plan = state
        .plans
        .insert_plan(NewPlan {
            name: req.name,
            location: req.location,
            start_date: req.start_date,
            end_date: req.end_date,
            description: req.description,
            image_url,
        })
        .await?;

    if let Err(e) = state.cache.invalidate(&CacheKey::plans()).await {
        tracing::warn!("Failed to invalidate plan listing cache: {}", e);
    }

    tracing::info!("Plan {} created by {}", plan.id, user.email());

    Ok(HttpResponse::Created().json(CreatePlanResponse {
        success: true,
        id: plan.id,
    }))
}

async fn get_plan(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = uuid::Uuid::parse_str(&path.into_inner())
        .map_err(|_| ApiError::bad_request("Invalid plan id"))?;

    let cache_key = CacheKey::plan(&id);
    if let Ok(Some(plan)) = state.cache.get::<TravelPlan>(&cache_key).await {
        return Ok(HttpResponse::Ok().json(plan));
    }

    let plan = state
        .plans
        .get_plan(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))?;

    if let Err(e) = state.cache.set(&cache_key, &plan).await {
        tracing::warn!("Failed to cache plan {}: {}", id, e);
    }

    Ok(HttpResponse::Ok().json(plan))
}
