// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod similarity;

pub use filters::matches_candidate_query;
pub use matcher::{MatchError, MatchRequest, MatchResult, Matcher};
pub use similarity::{jaccard_similarity, similarity_to_score, InterestSet};
