use crate::core::similarity::InterestSet;
use serde::{Deserialize, Serialize};

/// Registered traveler as persisted in the user store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub username: String,
    /// bcrypt hash, never serialized
    #[serde(skip)]
    pub password_hash: String,
    #[serde(default)]
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
    #[serde(default)]
    pub interests: InterestSet,
    #[serde(rename = "profilePhoto", default)]
    pub profile_photo: String,
    #[serde(default)]
    pub preference: String,
    #[serde(default)]
    pub bio: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl User {
    /// Fresh account as created at signup: empty profile, no interests
    pub fn new_account(email: &str, username: &str, password_hash: String) -> Self {
        Self {
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
            created_at: Some(chrono::Utc::now()),
            ..Default::default()
        }
    }

    /// Which onboarding page the user still has to complete
    pub fn next_step(&self) -> OnboardingStep {
        if self.name.trim().is_empty() {
            OnboardingStep::Profile
        } else if self.interests.is_empty() {
            OnboardingStep::Interests
        } else {
            OnboardingStep::Complete
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingStep {
    Profile,
    Interests,
    Complete,
}

/// Profile fields set during profile completion
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub nationality: String,
    pub birthday: Option<String>,
    pub gender: String,
    pub trip_type: String,
    pub destination: String,
    pub languages: Vec<String>,
    /// Only replaces the stored photo reference when set
    pub profile_photo: Option<String>,
}

impl ProfileUpdate {
    /// Trim language entries and drop the blank ones
    pub fn clean_languages(languages: Vec<String>) -> Vec<String> {
        languages
            .into_iter()
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .collect()
    }

    pub fn apply_to(&self, user: &mut User) {
        user.name = self.name.clone();
        user.nationality = self.nationality.clone();
        user.birthday = self.birthday.clone();
        user.gender = self.gender.clone();
        user.trip_type = self.trip_type.clone();
        user.destination = self.destination.clone();
        user.languages = self.languages.clone();
        if let Some(photo) = self.profile_photo.as_ref().filter(|p| !p.is_empty()) {
            user.profile_photo = photo.clone();
        }
    }
}

/// Gender criterion of a match request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenderFilter {
    #[default]
    All,
    Only(String),
}

impl GenderFilter {
    /// Sentinel value meaning "no filtering"
    pub const ALL: &'static str = "all";

    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None => GenderFilter::All,
            Some(v) if v.is_empty() || v == Self::ALL => GenderFilter::All,
            Some(v) => GenderFilter::Only(v.to_string()),
        }
    }

    #[inline]
    pub fn accepts(&self, gender: &str) -> bool {
        match self {
            GenderFilter::All => true,
            GenderFilter::Only(wanted) => wanted == gender,
        }
    }

    pub fn as_option(&self) -> Option<&str> {
        match self {
            GenderFilter::All => None,
            GenderFilter::Only(wanted) => Some(wanted.as_str()),
        }
    }
}

/// Candidate pool query handed to the user store
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub exclude_email: String,
    pub destination: String,
    pub gender: GenderFilter,
}

/// Scored companion suggestion returned to the client
///
/// Whitelisted projection of a [`User`]: no password hash, no interests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub name: String,
    pub username: String,
    pub nationality: String,
    #[serde(rename = "profilePhoto")]
    pub profile_photo: String,
    pub birthday: Option<String>,
    pub gender: String,
    pub languages: Vec<String>,
    pub destination: String,
    pub email: String,
    pub similarity_score: f64,
}

impl MatchCandidate {
    pub fn from_user(user: User, similarity_score: f64) -> Self {
        Self {
            name: user.name,
            username: user.username,
            nationality: user.nationality,
            profile_photo: user.profile_photo,
            birthday: user.birthday,
            gender: user.gender,
            languages: user.languages,
            destination: user.destination,
            email: user.email,
            similarity_score,
        }
    }
}

/// Identity vouched for by the session mechanism
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub username: String,
    pub token_id: String,
}

/// Travel plan listed on the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelPlan {
    pub id: uuid::Uuid,
    pub name: String,
    pub location: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub description: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub participants: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Plan fields supplied by the creator
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub image_url: String,
}

impl NewPlan {
    pub fn into_plan(self) -> TravelPlan {
        TravelPlan {
            id: uuid::Uuid::new_v4(),
            name: self.name,
            location: self.location,
            start_date: self.start_date,
            end_date: self.end_date,
            description: self.description,
            image_url: self.image_url,
            participants: vec![],
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onboarding_steps() {
        let mut user = User::new_account("a@b.c", "ana", "hash".to_string());
        assert_eq!(user.next_step(), OnboardingStep::Profile);

        user.name = "Ana".to_string();
        assert_eq!(user.next_step(), OnboardingStep::Interests);

        user.interests = InterestSet::from_iter(["hiking"]);
        assert_eq!(user.next_step(), OnboardingStep::Complete);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new_account("a@b.c", "ana", "secret-hash".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_gender_filter_parse() {
        assert_eq!(GenderFilter::parse(None), GenderFilter::All);
        assert_eq!(GenderFilter::parse(Some("")), GenderFilter::All);
        assert_eq!(GenderFilter::parse(Some("all")), GenderFilter::All);
        assert_eq!(
            GenderFilter::parse(Some("female")),
            GenderFilter::Only("female".to_string())
        );
        assert!(GenderFilter::All.accepts("male"));
        assert!(!GenderFilter::parse(Some("female")).accepts("Female"));
    }

    #[test]
    fn test_profile_update_keeps_photo_when_absent() {
        let mut user = User::new_account("a@b.c", "ana", String::new());
        user.profile_photo = "/static/uploads/old.png".to_string();

        let update = ProfileUpdate {
            name: "Ana".to_string(),
            languages: ProfileUpdate::clean_languages(vec![" en ".into(), "  ".into(), "es".into()]),
            ..Default::default()
        };
        update.apply_to(&mut user);

        assert_eq!(user.profile_photo, "/static/uploads/old.png");
        assert_eq!(user.languages, vec!["en", "es"]);
    }
}
