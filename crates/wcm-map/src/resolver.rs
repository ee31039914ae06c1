//! Exact-first word resolution with bounded fuzzy fallback.

use tracing::debug;

use wcm_model::{SearchOptions, Word};

use crate::index::Generation;
use crate::score::{Candidate, ConfidencePolicy, edit_distance};

/// Outcome of resolving one normalized word.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Exact(Candidate),
    /// Matches within the bound and above the confidence floor, best first.
    /// `suggestions` holds the close words that did not qualify.
    Fuzzy {
        matches: Vec<Candidate>,
        suggestions: Vec<Candidate>,
    },
    NotFound { suggestions: Vec<Candidate> },
}

impl Resolution {
    pub fn best(&self) -> Option<&Candidate> {
        match self {
            Self::Exact(candidate) => Some(candidate),
            Self::Fuzzy { matches, .. } => matches.first(),
            Self::NotFound { .. } => None,
        }
    }
}

/// Resolves words against one generation.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyResolver<'a> {
    generation: &'a Generation,
    options: &'a SearchOptions,
    policy: &'a dyn ConfidencePolicy,
}

impl<'a> FuzzyResolver<'a> {
    pub fn new(
        generation: &'a Generation,
        options: &'a SearchOptions,
        policy: &'a dyn ConfidencePolicy,
    ) -> Self {
        Self {
            generation,
            options,
            policy,
        }
    }

    /// Resolves with the length-scaled bound from the search options.
    pub fn resolve(&self, word: &Word) -> Resolution {
        let bound = self.options.edit_distance.for_length(word.char_len());
        self.resolve_within(word, bound)
    }

    /// Resolves with an explicit edit-distance bound.
    ///
    /// Candidates are probed up to the full depth of the deletion index so
    /// that words just outside `max_distance` can still be offered as
    /// suggestions.
    pub fn resolve_within(&self, word: &Word, max_distance: usize) -> Resolution {
        let query_len = word.char_len();
        if self.generation.contains_word(word) {
            return Resolution::Exact(Candidate {
                word: word.clone(),
                distance: 0,
                confidence: self.policy.confidence(0, query_len, query_len),
            });
        }

        let index = self.generation.fuzzy();
        let probe_depth = index.max_distance().max(max_distance);
        let mut scored: Vec<Candidate> = index
            .candidates(word.as_str(), probe_depth)
            .into_iter()
            .filter_map(|candidate| {
                let candidate_len = candidate.char_len();
                if candidate_len.abs_diff(query_len) > probe_depth {
                    return None;
                }
                let distance = edit_distance(word.as_str(), candidate.as_str());
                (distance <= probe_depth).then(|| Candidate {
                    word: candidate.clone(),
                    distance,
                    confidence: self.policy.confidence(distance, query_len, candidate_len),
                })
            })
            .collect();
        scored.sort_by(Candidate::rank_cmp);

        let (matches, rest): (Vec<Candidate>, Vec<Candidate>) =
            scored.into_iter().partition(|candidate| {
                candidate.distance <= max_distance
                    && candidate.confidence >= self.options.min_confidence
            });
        let suggestions: Vec<Candidate> =
            rest.into_iter().take(self.options.suggestion_limit).collect();

        debug!(
            query = word.as_str(),
            max_distance,
            matches = matches.len(),
            suggestions = suggestions.len(),
            "fuzzy resolution"
        );

        if matches.is_empty() {
            Resolution::NotFound { suggestions }
        } else {
            Resolution::Fuzzy {
                matches,
                suggestions,
            }
        }
    }
}
