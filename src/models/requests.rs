use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find travel companions
///
/// Fields stay loosely typed so that the matcher can apply its own
/// coercion rules (`numPeople` may arrive as a number or a string).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindMatchesRequest {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(rename = "numPeople", default)]
    pub num_people: Option<serde_json::Value>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Account creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Credentials login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Profile completion request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub gender: String,
    #[serde(rename = "tripType", default)]
    pub trip_type: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(rename = "profilePhoto", default)]
    pub profile_photo: Option<String>,
}

/// Interest selection request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInterestsRequest {
    #[serde(default)]
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBioRequest {
    #[serde(default)]
    pub bio: String,
}

/// Travel plan creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "startDate", default)]
    pub start_date: String,
    #[serde(rename = "endDate", default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

/// Query string of the upload endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}
