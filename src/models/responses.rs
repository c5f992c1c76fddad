use serde::{Deserialize, Serialize};
use crate::models::domain::OnboardingStep;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Issued session returned by signup and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub email: String,
    pub username: String,
    pub next: OnboardingStep,
}

/// Logged-in user and the onboarding page they still need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub email: String,
    pub username: String,
    pub next: OnboardingStep,
}

/// Generic acknowledgement, optionally pointing at the next onboarding step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<OnboardingStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanResponse {
    pub success: bool,
    pub id: uuid::Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub path: String,
}
