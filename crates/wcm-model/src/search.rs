//! Search result types for single-word and multi-word queries.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{ColumnId, Word};

/// How a result was matched against the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
}

/// A single resolved word with its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The vocabulary word that matched.
    pub word: Word,
    /// Similarity score in `[0, 1]`; exact matches score 1.0.
    pub confidence: f64,
    pub match_type: MatchType,
    /// Edit distance between query and word (0 for exact matches).
    pub edit_distance: Option<usize>,
    /// Columns mapped to the word, in build order, duplicates included.
    pub columns: Vec<ColumnId>,
    /// Description of the edit that turns the query into the word.
    pub changes: Option<String>,
}

impl SearchResult {
    pub fn is_exact(&self) -> bool {
        self.match_type == MatchType::Exact
    }
}

/// Response to a single-word search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Raw query as supplied by the caller.
    pub query: String,
    /// Query after normalization.
    pub normalized: Word,
    pub exact_match: bool,
    /// Best match first, followed by lower-ranked near matches when requested.
    pub results: Vec<SearchResult>,
    /// Vocabulary words close to the query that did not qualify as results.
    pub suggestions: Vec<Word>,
}

impl SearchResponse {
    /// Response for a blank query.
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            normalized: Word::new(""),
            exact_match: false,
            results: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn best(&self) -> Option<&SearchResult> {
        self.results.first()
    }

    /// Columns across all results, first occurrence order, without duplicates.
    pub fn unique_columns(&self) -> Vec<ColumnId> {
        let mut seen = HashSet::new();
        self.results
            .iter()
            .flat_map(|result| result.columns.iter())
            .filter(|column| seen.insert(*column))
            .cloned()
            .collect()
    }

    /// Columns across all results, duplicates included.
    pub fn all_columns(&self) -> Vec<ColumnId> {
        self.results
            .iter()
            .flat_map(|result| result.columns.iter().cloned())
            .collect()
    }
}

/// Multi-word set operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetOperation {
    #[serde(alias = "or")]
    Union,
    #[serde(alias = "and")]
    Intersection,
}

impl SetOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Intersection => "intersection",
        }
    }
}

/// Outcome of a union or intersection over several words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOperationResult {
    pub operation: SetOperation,
    /// Best match for every query word that resolved, in query order.
    pub resolved: Vec<SearchResult>,
    /// Query words that did not resolve and were left out.
    pub unresolved: Vec<String>,
    /// Result columns, first occurrence order, without duplicates.
    pub columns: Vec<ColumnId>,
}

impl SetOperationResult {
    /// Result columns with every occurrence from the per-word lists kept.
    pub fn all_columns(&self) -> Vec<ColumnId> {
        let members: BTreeSet<&ColumnId> = self.columns.iter().collect();
        self.resolved
            .iter()
            .flat_map(|result| result.columns.iter())
            .filter(|column| members.contains(column))
            .cloned()
            .collect()
    }

    /// `(word, column)` pairs for every result column occurrence, ready for
    /// table ranking.
    pub fn column_pairs(&self) -> Vec<(Word, ColumnId)> {
        let members: BTreeSet<&ColumnId> = self.columns.iter().collect();
        self.resolved
            .iter()
            .flat_map(|result| {
                result
                    .columns
                    .iter()
                    .filter(|column| members.contains(column))
                    .map(|column| (result.word.clone(), column.clone()))
            })
            .collect()
    }
}
