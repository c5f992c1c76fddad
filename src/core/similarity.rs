use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of opaque interest tags
///
/// Duplicates collapse and order is irrelevant. Serialized as a sorted list
/// of strings, which is also how the stores persist it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterestSet(BTreeSet<String>);

impl InterestSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// Number of tags present in both sets
    #[inline]
    pub fn intersection_len(&self, other: &InterestSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Number of distinct tags present in either set
    #[inline]
    pub fn union_len(&self, other: &InterestSet) -> usize {
        self.0.len() + other.0.len() - self.intersection_len(other)
    }
}

impl<T: Into<String>> FromIterator<T> for InterestSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for InterestSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|` in [0, 1]
///
/// Defined as 0 when the union is empty.
#[inline]
pub fn jaccard_similarity(a: &InterestSet, b: &InterestSet) -> f64 {
    let union = a.union_len(b);
    if union == 0 {
        return 0.0;
    }
    a.intersection_len(b) as f64 / union as f64
}

/// Convert a similarity in [0, 1] to a percentage rounded to two decimals
///
/// Exact halves round to even, so 1/32 scores 3.12.
#[inline]
pub fn similarity_to_score(similarity: f64) -> f64 {
    (similarity * 100.0 * 100.0).round_ties_even() / 100.0
}
