// HTTP-level tests for the Tripmate API, backed by the in-memory store

use actix_web::{http::StatusCode, test, web, App};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tripmate::core::Matcher;
use tripmate::models::{
    CreatePlanResponse, ErrorResponse, HealthResponse, MatchCandidate, OnboardingStep,
    SessionResponse, StatusResponse, SuccessResponse, TravelPlan, UploadResponse, User,
};
use tripmate::routes::{self, AppState};
use tripmate::services::{CacheManager, MemoryStore, SessionManager, UploadStore};

const MAX_UPLOAD_BYTES: usize = 1024;

fn test_state(upload_dir: &Path) -> AppState {
    let store = Arc::new(MemoryStore::new());

    AppState {
        users: store.clone(),
        plans: store,
        cache: Arc::new(CacheManager::in_memory(100, 60)),
        sessions: Arc::new(SessionManager::new("test-secret", "tripmate", 3600)),
        uploads: Arc::new(UploadStore::new(upload_dir, "/static/uploads", MAX_UPLOAD_BYTES)),
        matcher: Matcher::with_defaults(),
        bcrypt_cost: 4,
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(routes::json_config())
                .app_data(routes::query_config())
                .app_data(routes::payload_config(MAX_UPLOAD_BYTES))
                .configure(routes::configure_routes),
        )
        .await
    };
}

/// Register an account and return its session token
macro_rules! signup {
    ($app:expr, $username:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({ "username": $username, "email": $email, "password": "s3cret" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: SessionResponse = test::read_body_json(resp).await;
        assert_eq!(body.next, OnboardingStep::Profile);
        body.token
    }};
}

/// Fill in the profile and interests of a signed-up account
macro_rules! onboard {
    ($app:expr, $token:expr, $name:expr, $destination:expr, $gender:expr, $interests:expr) => {{
        let req = test::TestRequest::put()
            .uri("/api/v1/profile")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json(json!({
                "name": $name,
                "nationality": "PT",
                "gender": $gender,
                "tripType": "backpacking",
                "destination": $destination,
                "languages": ["English", " ", "Portuguese "]
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: SuccessResponse = test::read_body_json(resp).await;
        assert_eq!(body.next, Some(OnboardingStep::Interests));

        let req = test::TestRequest::put()
            .uri("/api/v1/profile/interests")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json(json!({ "interests": $interests }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: SuccessResponse = test::read_body_json(resp).await;
        assert_eq!(body.next, Some(OnboardingStep::Complete));
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn test_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: HealthResponse = test::read_body_json(resp).await;
    assert_eq!(body.status, "healthy");
}

#[actix_web::test]
async fn test_signup_onboarding_and_login() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));

    let token = signup!(app, "ana", "ana@trip.test");

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/status")
        .insert_header(bearer(&token))
        .to_request();
    let status: StatusResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status.next, OnboardingStep::Profile);

    onboard!(app, token, "Ana", "Lisbon", "female", ["hiking", "food"]);

    let req = test::TestRequest::get()
        .uri("/api/v1/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let raw = test::read_body(resp).await;
    assert!(!String::from_utf8_lossy(&raw).contains("password"));
    let profile: User = serde_json::from_slice(&raw).unwrap();
    assert_eq!(profile.languages, vec!["English", "Portuguese"]);
    assert_eq!(profile.interests.len(), 2);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "ana@trip.test", "password": "s3cret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let session: SessionResponse = test::read_body_json(resp).await;
    assert_eq!(session.next, OnboardingStep::Complete);
    assert_eq!(session.username, "ana");
}

#[actix_web::test]
async fn test_duplicate_signup_and_bad_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));

    signup!(app, "ana", "ana@trip.test");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "username": "ana2", "email": "ana@trip.test", "password": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "ana@trip.test", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.message, "Invalid credentials, try again.");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "nobody@trip.test", "password": "s3cret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_protected_routes_require_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "destination": "Lisbon", "numPeople": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/plans")
        .insert_header(bearer("not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "Not logged in");
}

#[actix_web::test]
async fn test_find_matches_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));

    let me = signup!(app, "me", "me@trip.test");
    onboard!(app, me, "Me", "Lisbon", "female", ["hiking", "food"]);
    let x = signup!(app, "x", "x@trip.test");
    onboard!(app, x, "X", "Lisbon", "male", ["hiking", "art"]);
    let y = signup!(app, "y", "y@trip.test");
    onboard!(app, y, "Y", "Lisbon", "female", ["food", "hiking"]);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(bearer(&me))
        .set_json(json!({ "destination": "Lisbon", "numPeople": "1", "gender": "all" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let matches: Vec<MatchCandidate> = test::read_body_json(resp).await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].username, "y");
    assert_eq!(matches[0].similarity_score, 100.0);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(bearer(&me))
        .set_json(json!({ "destination": "Lisbon", "numPeople": 5, "gender": "male" }))
        .to_request();
    let matches: Vec<MatchCandidate> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].username, "x");
    assert_eq!(matches[0].similarity_score, 33.33);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(bearer(&me))
        .set_json(json!({ "destination": "Porto", "numPeople": 5 }))
        .to_request();
    let matches: Vec<MatchCandidate> = test::call_and_read_body_json(&app, req).await;
    assert!(matches.is_empty());
}

#[actix_web::test]
async fn test_find_matches_rejections() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));

    let token = signup!(app, "ana", "ana@trip.test");

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(bearer(&token))
        .set_json(json!({ "numPeople": 3 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.message, "Destination is required");

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(bearer(&token))
        .set_json(json!({ "destination": "Lisbon" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.message, "Current user has no interests set");

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_json");
}

#[actix_web::test]
async fn test_plans_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));
    let token = signup!(app, "ana", "ana@trip.test");

    let req = test::TestRequest::post()
        .uri("/api/v1/plans")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Surf week", "location": "Ericeira" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.message, "No image URL provided");

    // Prime the listing cache so the insert has to invalidate it
    let req = test::TestRequest::get()
        .uri("/api/v1/plans")
        .insert_header(bearer(&token))
        .to_request();
    let plans: Vec<TravelPlan> = test::call_and_read_body_json(&app, req).await;
    assert!(plans.is_empty());

    let req = test::TestRequest::post()
        .uri("/api/v1/plans")
        .insert_header(bearer(&token))
        .set_json(json!({
            "name": "Surf week",
            "location": "Ericeira",
            "startDate": "2026-07-01",
            "endDate": "2026-07-08",
            "description": "Waves and grilled fish",
            "imageUrl": "https://img.test/surf.jpg"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CreatePlanResponse = test::read_body_json(resp).await;
    assert!(created.success);

    let req = test::TestRequest::get()
        .uri("/api/v1/plans")
        .insert_header(bearer(&token))
        .to_request();
    let plans: Vec<TravelPlan> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].id, created.id);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/plans/{}", created.id))
        .insert_header(bearer(&token))
        .to_request();
    let plan: TravelPlan = test::call_and_read_body_json(&app, req).await;
    assert_eq!(plan.location, "Ericeira");

    let req = test::TestRequest::get()
        .uri("/api/v1/plans/not-a-uuid")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/plans/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));
    let token = signup!(app, "ana", "ana@trip.test");

    let req = test::TestRequest::post()
        .uri("/api/v1/uploads?filename=my%20beach.png")
        .insert_header(bearer(&token))
        .set_payload(vec![0u8; 64])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: UploadResponse = test::read_body_json(resp).await;
    assert!(body.path.starts_with("/static/uploads/"));
    assert!(body.path.ends_with("_my_beach.png"));

    let stored = body.path.trim_start_matches("/static/uploads/");
    assert!(dir.path().join(stored).exists());

    let req = test::TestRequest::post()
        .uri("/api/v1/uploads?filename=script.sh")
        .insert_header(bearer(&token))
        .set_payload(vec![0u8; 64])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/uploads?filename=huge.jpg")
        .insert_header(bearer(&token))
        .set_payload(vec![0u8; MAX_UPLOAD_BYTES + 1])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let req = test::TestRequest::post()
        .uri("/api/v1/uploads")
        .insert_header(bearer(&token))
        .set_payload(vec![0u8; 8])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_user_lookup_and_bio() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));
    let ana = signup!(app, "ana", "ana@trip.test");
    let ben = signup!(app, "ben", "ben@trip.test");

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/bio")
        .insert_header(bearer(&ben))
        .set_json(json!({ "bio": "  Slow travel fan  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/ben")
        .insert_header(bearer(&ana))
        .to_request();
    let user: User = test::call_and_read_body_json(&app, req).await;
    assert_eq!(user.bio, "Slow travel fan");

    let req = test::TestRequest::get()
        .uri("/api/v1/users/nobody")
        .insert_header(bearer(&ana))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/interests")
        .insert_header(bearer(&ana))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_logout_revokes_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(test_state(dir.path()));
    let token = signup!(app, "ana", "ana@trip.test");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/status")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
