use crate::core::{
    filters::matches_candidate_query,
    similarity::{jaccard_similarity, similarity_to_score, InterestSet},
};
use crate::models::{CandidateQuery, GenderFilter, MatchCandidate, User, VerifiedIdentity};
use crate::services::UserStore;
use std::cmp::Ordering;
use thiserror::Error;

/// Errors surfaced by the matching engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Precondition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Validated match criteria
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub destination: String,
    pub desired_count: usize,
    pub gender: GenderFilter,
}

impl MatchRequest {
    /// Build a request, rejecting a missing or blank destination
    ///
    /// A zero count is raised to 1.
    pub fn new(
        destination: Option<&str>,
        desired_count: usize,
        gender: GenderFilter,
    ) -> Result<Self, MatchError> {
        let destination = match destination {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => return Err(MatchError::Validation("Destination is required".to_string())),
        };

        Ok(Self {
            destination,
            desired_count: desired_count.max(1),
            gender,
        })
    }
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<MatchCandidate>,
    pub total_candidates: usize,
}

/// Matching orchestrator
///
/// # Pipeline Stages
/// 1. Load the requester's interest set
/// 2. Query the candidate pool from the user store
/// 3. Jaccard scoring, dropping zero-overlap candidates
/// 4. Ranking and truncation
///
/// Scoring is a linear scan over the pool; there is no similarity index.
#[derive(Debug, Clone)]
pub struct Matcher {
    default_count: usize,
    max_count: usize,
}

impl Matcher {
    pub fn new(default_count: usize, max_count: usize) -> Self {
        let max_count = max_count.max(1);
        Self {
            default_count: default_count.clamp(1, max_count),
            max_count,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(1, 100)
    }

    /// Coerce a client-supplied count into `1..=max_count`
    ///
    /// Accepts JSON numbers (fractions are truncated) and integer strings;
    /// anything else (absent, below 1, non-numeric) falls back to the
    /// default.
    pub fn coerce_count(&self, value: Option<&serde_json::Value>) -> usize {
        let parsed = match value {
            Some(serde_json::Value::Number(n)) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 1.0)
                    .map(|f| f.trunc() as u64)
            }),
            Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        };

        match parsed {
            Some(n) if n > 0 => (n.min(self.max_count as u64)) as usize,
            _ => self.default_count,
        }
    }

    /// Build a validated request from raw client fields
    pub fn build_request(
        &self,
        destination: Option<&str>,
        num_people: Option<&serde_json::Value>,
        gender: Option<&str>,
    ) -> Result<MatchRequest, MatchError> {
        MatchRequest::new(
            destination,
            self.coerce_count(num_people),
            GenderFilter::parse(gender),
        )
    }

    /// Find travel companions for the requester
    ///
    /// Read-only against the store. Store failures are reported as
    /// [`MatchError::Internal`] and not retried.
    pub async fn find_matches(
        &self,
        store: &dyn UserStore,
        requester: &VerifiedIdentity,
        request: &MatchRequest,
    ) -> Result<MatchResult, MatchError> {
        let current_user = store
            .get_user(&requester.email)
            .await
            .map_err(|e| MatchError::Internal(e.to_string()))?;

        let interests = match current_user {
            Some(user) if !user.interests.is_empty() => user.interests,
            _ => {
                return Err(MatchError::Precondition(
                    "Current user has no interests set".to_string(),
                ))
            }
        };

        let query = CandidateQuery {
            exclude_email: requester.email.clone(),
            destination: request.destination.clone(),
            gender: request.gender.clone(),
        };

        let candidates = store
            .find_candidates(&query)
            .await
            .map_err(|e| MatchError::Internal(e.to_string()))?;

        tracing::debug!(
            "Scoring {} candidates for {} (destination: {})",
            candidates.len(),
            requester.email,
            request.destination
        );

        Ok(self.rank(&interests, &query, candidates, request.desired_count))
    }

    /// Score, filter, sort and truncate a candidate pool
    pub fn rank(
        &self,
        interests: &InterestSet,
        query: &CandidateQuery,
        candidates: Vec<User>,
        limit: usize,
    ) -> MatchResult {
        let total_candidates = candidates.len();
        let limit = limit.clamp(1, self.max_count);

        let mut scored: Vec<MatchCandidate> = candidates
            .into_iter()
            // The store already filters; re-check so a lax backend cannot
            // leak the requester or out-of-pool users
            .filter(|user| matches_candidate_query(user, query))
            .filter_map(|user| {
                let similarity = jaccard_similarity(interests, &user.interests);
                if similarity > 0.0 {
                    Some(MatchCandidate::from_user(user, similarity_to_score(similarity)))
                } else {
                    None
                }
            })
            .collect();

        // Score descending, then email ascending for a stable order on ties
        scored.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.email.cmp(&b.email))
        });

        scored.truncate(limit);

        MatchResult {
            matches: scored,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
