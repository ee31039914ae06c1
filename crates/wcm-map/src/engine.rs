//! Query engine: single-word search, reverse lookup and set operations.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use wcm_model::{
    ColumnId, MapperError, MatchType, Result, SearchOptions, SearchResponse, SearchResult,
    SetOperation, SetOperationResult, Word,
};

use crate::index::Generation;
use crate::resolver::{FuzzyResolver, Resolution};
use crate::score::{Candidate, ConfidencePolicy, LengthNormalized, describe_edit};

/// Minimum number of resolved words a set operation needs.
pub const MIN_SET_OPERANDS: usize = 2;

static DEFAULT_POLICY: LengthNormalized = LengthNormalized;

/// Read-only query surface over one generation.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    generation: &'a Generation,
    options: &'a SearchOptions,
    policy: &'a dyn ConfidencePolicy,
}

impl<'a> QueryEngine<'a> {
    pub fn new(generation: &'a Generation, options: &'a SearchOptions) -> Self {
        Self {
            generation,
            options,
            policy: &DEFAULT_POLICY,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: &'a dyn ConfidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn generation(&self) -> &'a Generation {
        self.generation
    }

    fn resolver(&self) -> FuzzyResolver<'a> {
        FuzzyResolver::new(self.generation, self.options, self.policy)
    }

    /// Searches for one word.
    ///
    /// An exact hit yields a single result. A fuzzy hit yields the best match,
    /// followed by further near matches when `include_suggestions` is set.
    /// A blank query yields an empty response.
    pub fn search(&self, raw: &str, include_suggestions: bool) -> Result<SearchResponse> {
        if raw.trim().is_empty() {
            return Ok(SearchResponse::empty(raw));
        }
        let word = Word::new(raw);
        let query_len = word.char_len();

        match self.resolver().resolve(&word) {
            Resolution::Exact(candidate) => Ok(SearchResponse {
                query: raw.to_string(),
                exact_match: true,
                results: vec![self.to_result(&candidate, query_len, MatchType::Exact)],
                normalized: word,
                suggestions: Vec::new(),
            }),
            Resolution::Fuzzy {
                matches,
                suggestions,
            } => {
                let keep = if include_suggestions {
                    (1 + self.options.suggestion_limit).min(self.options.max_results.max(1))
                } else {
                    1
                };
                let results = matches
                    .iter()
                    .take(keep)
                    .map(|candidate| self.to_result(candidate, query_len, MatchType::Fuzzy))
                    .collect();
                let suggestions = if include_suggestions {
                    suggestions.into_iter().map(|candidate| candidate.word).collect()
                } else {
                    Vec::new()
                };
                Ok(SearchResponse {
                    query: raw.to_string(),
                    normalized: word,
                    exact_match: false,
                    results,
                    suggestions,
                })
            }
            Resolution::NotFound { suggestions } => Err(MapperError::WordNotFound {
                word: raw.to_string(),
                suggestions: suggestions.into_iter().map(|candidate| candidate.word).collect(),
            }),
        }
    }

    /// Best single match for `raw`.
    pub fn best_match(&self, raw: &str) -> Result<Option<SearchResult>> {
        let response = self.search(raw, false)?;
        Ok(response.results.into_iter().next())
    }

    /// Words mapped to `column`.
    pub fn reverse_lookup(&self, column: &ColumnId) -> Result<&'a BTreeSet<Word>> {
        self.generation
            .words_for(column)
            .ok_or_else(|| MapperError::ColumnNotFound {
                column: column.clone(),
            })
    }

    /// Resolves every word independently and combines their columns.
    ///
    /// Words that do not resolve are reported in `unresolved` and left out.
    /// Fewer than two resolved words fails the whole operation.
    pub fn set_operation<S: AsRef<str>>(
        &self,
        words: &[S],
        operation: SetOperation,
    ) -> Result<SetOperationResult> {
        let result = self.combine(words, operation)?;
        if result.resolved.len() < MIN_SET_OPERANDS {
            return Err(MapperError::InsufficientInput {
                resolved: result.resolved.len(),
                required: MIN_SET_OPERANDS,
                unresolved: result.unresolved,
            });
        }
        Ok(result)
    }

    /// Like [`Self::set_operation`] without the operand minimum, so a single
    /// word (or none at all) is a valid selection.
    pub fn combine<S: AsRef<str>>(
        &self,
        words: &[S],
        operation: SetOperation,
    ) -> Result<SetOperationResult> {
        let mut resolved = Vec::with_capacity(words.len());
        let mut unresolved = Vec::new();
        for raw in words {
            let raw = raw.as_ref();
            match self.best_match(raw) {
                Ok(Some(result)) => resolved.push(result),
                Ok(None) | Err(MapperError::WordNotFound { .. }) => {
                    debug!(word = raw, operation = operation.as_str(), "word left out of set operation");
                    unresolved.push(raw.to_string());
                }
                Err(other) => return Err(other),
            }
        }

        let lists: Vec<&[ColumnId]> = resolved
            .iter()
            .map(|result| result.columns.as_slice())
            .collect();
        let columns = match operation {
            SetOperation::Union => union_columns(&lists),
            SetOperation::Intersection => intersect_columns(&lists),
        };

        Ok(SetOperationResult {
            operation,
            resolved,
            unresolved,
            columns,
        })
    }

    pub fn union<S: AsRef<str>>(&self, words: &[S]) -> Result<SetOperationResult> {
        self.set_operation(words, SetOperation::Union)
    }

    pub fn intersection<S: AsRef<str>>(&self, words: &[S]) -> Result<SetOperationResult> {
        self.set_operation(words, SetOperation::Intersection)
    }

    fn to_result(&self, candidate: &Candidate, query_len: usize, match_type: MatchType) -> SearchResult {
        let columns = self
            .generation
            .columns(&candidate.word)
            .map(<[ColumnId]>::to_vec)
            .unwrap_or_default();
        SearchResult {
            word: candidate.word.clone(),
            confidence: candidate.confidence,
            match_type,
            edit_distance: Some(candidate.distance),
            columns,
            changes: describe_edit(query_len, candidate.word.char_len(), candidate.distance),
        }
    }
}

/// Ordered concatenation without repeats.
pub fn union_columns(lists: &[&[ColumnId]]) -> Vec<ColumnId> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|list| list.iter())
        .filter(|column| seen.insert(*column))
        .cloned()
        .collect()
}

/// Columns present in every list, in first-list order, without repeats.
pub fn intersect_columns(lists: &[&[ColumnId]]) -> Vec<ColumnId> {
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };
    let others: Vec<HashSet<&ColumnId>> = rest
        .iter()
        .map(|list| list.iter().collect())
        .collect();
    let mut seen = HashSet::new();
    first
        .iter()
        .filter(|column| others.iter().all(|set| set.contains(column)))
        .filter(|column| seen.insert(*column))
        .cloned()
        .collect()
}
