use crate::models::{
    InterestSet, ProfileUpdate, SuccessResponse, UpdateBioRequest, UpdateInterestsRequest,
    UpdateProfileRequest,
};
use crate::routes::{ApiError, AppState, AuthenticatedUser};
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/profile", web::get().to(get_profile))
        .route("/profile", web::put().to(update_profile))
        .route("/profile/interests", web::put().to(update_interests))
        .route("/profile/bio", web::put().to(update_bio))
        .route("/users/{username}", web::get().to(get_user));
}

async fn get_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let record = state
        .users
        .get_user(user.email())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(record))
}

/// Profile completion
///
/// PUT /api/v1/profile
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "nationality": "string",
///   "birthday": "string",
///   "gender": "string",
///   "tripType": "string",
///   "destination": "string",
///   "languages": ["string"],
///   "profilePhoto": "/static/uploads/..."
/// }
/// ```
async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let req = req.into_inner();
    let update = ProfileUpdate {
        name: req.name,
        nationality: req.nationality,
        birthday: req.birthday.filter(|b| !b.is_empty()),
        gender: req.gender,
        trip_type: req.trip_type,
        destination: req.destination,
        languages: ProfileUpdate::clean_languages(req.languages),
        profile_photo: req.profile_photo,
    };

    tracing::debug!("Updating profile of {}: {:?}", user.email(), update);

    if !state.users.update_profile(user.email(), &update).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    next_step_response(&state, user.email()).await
}

/// Interest selection
///
/// PUT /api/v1/profile/interests
async fn update_interests(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdateInterestsRequest>,
) -> Result<HttpResponse, ApiError> {
    let interests = match req.into_inner().interests {
        Some(tags) => InterestSet::from(tags),
        None => return Err(ApiError::bad_request("No interests received")),
    };

    if !state.users.update_interests(user.email(), &interests).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!("User {} selected {} interests", user.email(), interests.len());

    next_step_response(&state, user.email()).await
}

async fn update_bio(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdateBioRequest>,
) -> Result<HttpResponse, ApiError> {
    let bio = req.bio.trim();

    if !state.users.update_bio(user.email(), bio).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(SuccessResponse { success: true, next: None }))
}

/// Public view of another traveler
async fn get_user(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();

    match state.users.get_user_by_username(&username).await? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}

async fn next_step_response(state: &AppState, email: &str) -> Result<HttpResponse, ApiError> {
    let record = state
        .users
        .get_user(email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(SuccessResponse {
        success: true,
        next: Some(record.next_step()),
    }))
}
