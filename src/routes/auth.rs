use crate::models::{
    LoginRequest, OnboardingStep, SessionResponse, SignupRequest, StatusResponse, SuccessResponse,
    User, VerifiedIdentity,
};
use crate::routes::{ApiError, AppState};
use crate::services::IssuedSession;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest, HttpResponse};
use std::future::Future;
use std::pin::Pin;
use validator::Validate;

/// Configure session routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/auth/signup", web::post().to(signup))
        .route("/auth/login", web::post().to(login))
        .route("/auth/logout", web::post().to(logout))
        .route("/auth/status", web::get().to(status));
}

/// Identity of the caller, verified from the bearer session token
///
/// Handlers taking this extractor reject unauthenticated requests with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub VerifiedIdentity);

impl AuthenticatedUser {
    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| ApiError::Internal("application state not configured".to_string()))?;
            let token = token.ok_or_else(ApiError::unauthorized)?;
            let identity = state.sessions.verify(&token).await?;
            Ok(AuthenticatedUser(identity))
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn session_response(issued: IssuedSession, user: &User, next: OnboardingStep) -> SessionResponse {
    SessionResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        email: user.email.clone(),
        username: user.username.clone(),
        next,
    }
}

/// Create an account
///
/// POST /api/v1/auth/signup
///
/// Request body:
/// ```json
/// { "username": "string", "email": "string", "password": "string" }
/// ```
async fn signup(
    state: web::Data<AppState>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    if state.users.get_user(&req.email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists. Try logging in.".to_string()));
    }

    let password = req.password.clone();
    let cost = state.bcrypt_cost;
    let password_hash = web::block(move || bcrypt::hash(password, cost)).await??;

    let user = User::new_account(&req.email, &req.username, password_hash);
    state.users.create_user(user.clone()).await?;

    let issued = state
        .sessions
        .issue(&user.email, &user.username)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!("New account registered: {}", user.email);

    Ok(HttpResponse::Created().json(session_response(issued, &user, OnboardingStep::Profile)))
}

/// Log in with email and password
///
/// The response names the onboarding page the client should show next.
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid credentials, try again.".to_string());

    let user = state.users.get_user(&req.email).await?.ok_or_else(invalid)?;

    let password = req.password.clone();
    let hash = user.password_hash.clone();
    let valid = web::block(move || bcrypt::verify(password, &hash)).await??;
    if !valid {
        tracing::info!("Failed login for {}", req.email);
        return Err(invalid());
    }

    let issued = state
        .sessions
        .issue(&user.email, &user.username)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let next = user.next_step();

    Ok(HttpResponse::Ok().json(session_response(issued, &user, next)))
}

async fn logout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    state.sessions.revoke(&user.0).await;

    Ok(HttpResponse::Ok().json(SuccessResponse { success: true, next: None }))
}

/// Report which onboarding page the logged-in user still needs
async fn status(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let record = state
        .users
        .get_user(user.email())
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(HttpResponse::Ok().json(StatusResponse {
        email: record.email.clone(),
        username: record.username.clone(),
        next: record.next_step(),
    }))
}
