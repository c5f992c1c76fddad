// Unit tests for Tripmate

use tripmate::core::{
    filters::matches_candidate_query,
    similarity::{jaccard_similarity, similarity_to_score, InterestSet},
};
use tripmate::models::{CandidateQuery, GenderFilter, User};

fn interests(tags: &[&str]) -> InterestSet {
    tags.iter().copied().collect()
}

fn create_test_user(email: &str, destination: &str, gender: &str, tags: &[&str]) -> User {
    User {
        email: email.to_string(),
        username: email.to_string(),
        destination: destination.to_string(),
        gender: gender.to_string(),
        interests: interests(tags),
        ..Default::default()
    }
}

#[test]
fn test_jaccard_symmetry() {
    let samples = [
        (interests(&["hiking", "food"]), interests(&["hiking", "art"])),
        (interests(&["a", "b", "c"]), interests(&["c"])),
        (interests(&[]), interests(&["x"])),
        (interests(&["beach"]), interests(&["museums", "nightlife"])),
    ];

    for (a, b) in &samples {
        assert_eq!(jaccard_similarity(a, b), jaccard_similarity(b, a));
    }
}

#[test]
fn test_jaccard_self_similarity() {
    for tags in [&["a"][..], &["a", "b"][..], &["hiking", "food", "art", "music"][..]] {
        let set = interests(tags);
        assert_eq!(jaccard_similarity(&set, &set), 1.0);
    }
}

#[test]
fn test_jaccard_disjoint_is_zero() {
    assert_eq!(jaccard_similarity(&interests(&["a"]), &interests(&["b"])), 0.0);
    assert_eq!(jaccard_similarity(&interests(&[]), &interests(&["b"])), 0.0);
    assert_eq!(jaccard_similarity(&interests(&[]), &interests(&[])), 0.0);
}

#[test]
fn test_jaccard_range() {
    let a = interests(&["a", "b", "c", "d"]);
    let b = interests(&["c", "d", "e"]);
    let similarity = jaccard_similarity(&a, &b);

    assert!(similarity > 0.0 && similarity < 1.0);
    assert_eq!(similarity_to_score(similarity), 40.0);
}

#[test]
fn test_scenario_scores() {
    let requester = interests(&["hiking", "food"]);
    let x = interests(&["hiking", "art"]);
    let y = interests(&["food", "hiking"]);

    assert_eq!(similarity_to_score(jaccard_similarity(&requester, &x)), 33.33);
    assert_eq!(similarity_to_score(jaccard_similarity(&requester, &y)), 100.0);
}

#[test]
fn test_candidate_pool_predicate() {
    let query = CandidateQuery {
        exclude_email: "me@trip.test".to_string(),
        destination: "Bali".to_string(),
        gender: GenderFilter::Only("female".to_string()),
    };

    assert!(matches_candidate_query(&create_test_user("a@trip.test", "Bali", "female", &["surf"]), &query));
    assert!(!matches_candidate_query(&create_test_user("me@trip.test", "Bali", "female", &["surf"]), &query));
    assert!(!matches_candidate_query(&create_test_user("b@trip.test", "Bali", "male", &["surf"]), &query));
    assert!(!matches_candidate_query(&create_test_user("c@trip.test", "BALI", "female", &["surf"]), &query));
    assert!(!matches_candidate_query(&create_test_user("d@trip.test", "Bali", "female", &[]), &query));
}
