//! Tripmate - travel companion service
//!
//! Users register, complete a profile, pick interests, share travel plans
//! and get matched with other travelers heading to the same destination.
//! The matching engine ranks candidates by Jaccard similarity of their
//! interest sets.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchError, MatchRequest, MatchResult, jaccard_similarity, InterestSet};
pub use models::{User, MatchCandidate, GenderFilter, VerifiedIdentity, FindMatchesRequest};
pub use routes::AppState;
