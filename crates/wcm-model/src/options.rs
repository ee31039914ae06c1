//! Configuration options for word resolution.

use serde::{Deserialize, Serialize};

/// Maximum edit distance allowed for a query, scaled by its length.
///
/// Short words get a tighter bound so they do not fuzzy-match half the
/// vocabulary. Very short queries are further held back by the confidence
/// floor in [`SearchOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditDistancePolicy {
    /// Longest query length that still counts as a short word.
    pub short_word_max_len: usize,
    /// Bound for short words.
    pub short_word_distance: usize,
    /// Bound for everything longer.
    pub long_word_distance: usize,
}

impl Default for EditDistancePolicy {
    fn default() -> Self {
        Self {
            short_word_max_len: 4,
            short_word_distance: 1,
            long_word_distance: 2,
        }
    }
}

impl EditDistancePolicy {
    /// A policy that applies the same bound regardless of length.
    #[must_use]
    pub fn fixed(distance: usize) -> Self {
        Self {
            short_word_max_len: 0,
            short_word_distance: distance,
            long_word_distance: distance,
        }
    }

    /// Largest bound the policy can produce. Deletion neighborhoods are
    /// precomputed up to this depth.
    pub fn max_distance(&self) -> usize {
        self.short_word_distance.max(self.long_word_distance)
    }

    /// Bound for a query of `len` characters.
    pub fn for_length(&self, len: usize) -> usize {
        if len <= self.short_word_max_len {
            self.short_word_distance
        } else {
            self.long_word_distance
        }
    }
}

/// Options controlling single-word search and suggestion output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Maximum number of results returned for one query.
    pub max_results: usize,
    /// Maximum number of suggestions (extra near matches or not-found hints).
    pub suggestion_limit: usize,
    /// Fuzzy matches below this confidence are demoted to suggestions.
    pub min_confidence: f64,
    pub edit_distance: EditDistancePolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            suggestion_limit: 5,
            min_confidence: 0.6,
            edit_distance: EditDistancePolicy::default(),
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    #[must_use]
    pub fn with_edit_distance(mut self, policy: EditDistancePolicy) -> Self {
        self.edit_distance = policy;
        self
    }

    #[must_use]
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_scales_with_length() {
        let policy = EditDistancePolicy::default();
        assert_eq!(policy.for_length(1), 1);
        assert_eq!(policy.for_length(3), 1);
        assert_eq!(policy.for_length(4), 1);
        assert_eq!(policy.for_length(5), 2);
        assert_eq!(policy.for_length(40), 2);
        assert_eq!(policy.max_distance(), 2);
    }

    #[test]
    fn fixed_policy_ignores_length() {
        let policy = EditDistancePolicy::fixed(1);
        assert_eq!(policy.for_length(0), 1);
        assert_eq!(policy.for_length(30), 1);
    }
}
