//! Stand-in for the host launcher's fuzzy ranking collaborator.

use crate::rank::{Matcher, Ranking};

/// Case-insensitive subsequence ranking.
///
/// Matches when every query character appears in the candidate in order;
/// shorter candidates score higher. Deliberately naive — it only has to
/// exercise the adapter contract (positive score on match, 0 otherwise),
/// not approximate any real fuzzy algorithm.
pub struct SubsequenceRanking;

impl Ranking for SubsequenceRanking {
    type Matcher = SubsequenceMatcher;

    fn create(&self, query: &str) -> SubsequenceMatcher {
        SubsequenceMatcher {
            query: query.to_lowercase(),
        }
    }
}

pub struct SubsequenceMatcher {
    query: String,
}

impl Matcher for SubsequenceMatcher {
    fn score(&self, candidate: &str) -> i64 {
        let candidate = candidate.to_lowercase();
        let mut haystack = candidate.chars();
        for needle in self.query.chars() {
            if !haystack.any(|c| c == needle) {
                return 0;
            }
        }
        (100 - (candidate.chars().count() as i64 - self.query.chars().count() as i64)).max(1)
    }
}
