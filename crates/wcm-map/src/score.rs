//! Edit-distance scoring and confidence policies.
//!
//! Scoring is kept as pure functions of distances and lengths so it can be
//! swapped or tested without an index.

use std::cmp::Ordering;
use std::fmt;

use rapidfuzz::distance::levenshtein;
use wcm_model::Word;

/// Turns an edit distance into a confidence score in `[0, 1]`.
///
/// Implementations must return 1.0 for distance 0 and must not increase as
/// the distance grows for fixed lengths.
pub trait ConfidencePolicy: fmt::Debug + Send + Sync {
    fn confidence(&self, distance: usize, query_len: usize, candidate_len: usize) -> f64;
}

/// `1 - distance / max(query_len, candidate_len)`, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthNormalized;

impl ConfidencePolicy for LengthNormalized {
    fn confidence(&self, distance: usize, query_len: usize, candidate_len: usize) -> f64 {
        length_normalized_confidence(distance, query_len, candidate_len)
    }
}

pub fn length_normalized_confidence(distance: usize, query_len: usize, candidate_len: usize) -> f64 {
    let longest = query_len.max(candidate_len);
    if longest == 0 {
        return if distance == 0 { 1.0 } else { 0.0 };
    }
    (1.0 - distance as f64 / longest as f64).clamp(0.0, 1.0)
}

/// Levenshtein distance counted in characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein::distance(a.chars(), b.chars())
}

/// Short description of the edit that turns the query into the target.
///
/// Returns `None` when nothing changes.
pub fn describe_edit(query_len: usize, target_len: usize, distance: usize) -> Option<String> {
    if distance == 0 {
        return None;
    }
    match query_len.cmp(&target_len) {
        Ordering::Less => Some(format!("Insert {} character(s)", target_len - query_len)),
        Ordering::Greater => Some(format!("Delete {} character(s)", query_len - target_len)),
        Ordering::Equal => Some(format!("Substitute {distance} character(s)")),
    }
}

/// A scored vocabulary word.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub word: Word,
    pub distance: usize,
    pub confidence: f64,
}

impl Candidate {
    /// Lowest distance first, then lexicographically smallest word.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.word.cmp(&other.word))
    }
}
