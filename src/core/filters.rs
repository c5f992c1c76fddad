use crate::models::{CandidateQuery, User};

/// Check if a user belongs to the candidate pool of a query
///
/// A candidate is anyone other than the requester whose destination equals
/// the requested one exactly (case-sensitive), who has selected at least one
/// interest, and whose gender passes the filter.
#[inline]
pub fn matches_candidate_query(user: &User, query: &CandidateQuery) -> bool {
    // Never match the requester with themselves
    if user.email == query.exclude_email {
        return false;
    }

    if user.destination != query.destination {
        return false;
    }

    if user.interests.is_empty() {
        return false;
    }

    query.gender.accepts(&user.gender)
}
