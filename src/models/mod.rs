// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use crate::core::similarity::InterestSet;
pub use domain::{User, OnboardingStep, ProfileUpdate, GenderFilter, CandidateQuery, MatchCandidate, VerifiedIdentity, TravelPlan, NewPlan};
pub use requests::{FindMatchesRequest, SignupRequest, LoginRequest, UpdateProfileRequest, UpdateInterestsRequest, UpdateBioRequest, CreatePlanRequest, UploadQuery};
pub use responses::{HealthResponse, ErrorResponse, SessionResponse, StatusResponse, SuccessResponse, CreatePlanResponse, UploadResponse};
