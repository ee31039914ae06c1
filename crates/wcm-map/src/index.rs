//! Immutable index generations.
//!
//! A [`Generation`] bundles the word mapping, its reverse mapping, the
//! column-to-table index, and the deletion index derived from the
//! vocabulary. It is built in one pass and never mutated afterwards.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wcm_model::{ColumnId, EditDistancePolicy, Result, TableName, ValidationError, Word};

use crate::fuzzy::DeletionIndex;

/// Number of missing-table columns named in the build warning.
const UNKNOWN_TABLE_SAMPLE: usize = 5;

/// Monotonic identifier of a published generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(u64);

impl GenerationId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw rebuild input.
///
/// Words are kept raw so the build can report which spellings collided
/// after normalization.
#[derive(Debug, Clone, Default)]
pub struct IndexSource {
    pub mappings: Vec<(String, Vec<ColumnId>)>,
    pub column_tables: HashMap<ColumnId, TableName>,
}

impl IndexSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_word(mut self, word: &str, columns: &[&str]) -> Self {
        self.mappings.push((
            word.to_string(),
            columns.iter().map(|column| ColumnId::from(*column)).collect(),
        ));
        self
    }

    #[must_use]
    pub fn with_table(mut self, table: &str, columns: &[&str]) -> Self {
        for column in columns {
            self.column_tables
                .insert(ColumnId::from(*column), TableName::from(table));
        }
        self
    }
}

/// Size summary of a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub generation: GenerationId,
    pub total_words: usize,
    /// Word-to-column entries, duplicates included.
    pub total_mappings: usize,
    pub unique_columns: usize,
    pub tables: usize,
    pub unknown_table_columns: usize,
    pub deletion_variants: usize,
}

/// One immutable snapshot of the index.
#[derive(Debug, Clone)]
pub struct Generation {
    id: GenerationId,
    words: HashMap<Word, Vec<ColumnId>>,
    reverse: HashMap<ColumnId, BTreeSet<Word>>,
    column_tables: HashMap<ColumnId, TableName>,
    unknown_table_columns: BTreeSet<ColumnId>,
    fuzzy: DeletionIndex,
}

impl Generation {
    /// Builds a generation, precomputing deletion neighborhoods up to the
    /// largest bound `policy` can ask for.
    ///
    /// Fails if a word has no columns, lists an empty column id, or if two raw
    /// words normalize to the same `Word`. Columns without a table entry are
    /// assigned the `unknown` table.
    pub fn build(id: GenerationId, source: IndexSource, policy: &EditDistancePolicy) -> Result<Self> {
        let IndexSource {
            mappings,
            mut column_tables,
        } = source;

        let mut spellings: HashMap<Word, String> = HashMap::with_capacity(mappings.len());
        let mut words: HashMap<Word, Vec<ColumnId>> = HashMap::with_capacity(mappings.len());
        let mut reverse: HashMap<ColumnId, BTreeSet<Word>> = HashMap::new();

        for (raw, columns) in mappings {
            if columns.is_empty() {
                return Err(ValidationError::EmptyWord { word: raw }.into());
            }
            if columns.iter().any(|column| column.as_str().is_empty()) {
                return Err(ValidationError::EmptyColumnId { word: raw }.into());
            }
            let word = Word::new(&raw);
            if let Some(first) = spellings.get(&word) {
                return Err(ValidationError::DuplicateWord {
                    word,
                    first: first.clone(),
                    second: raw,
                }
                .into());
            }
            for column in &columns {
                reverse
                    .entry(column.clone())
                    .or_default()
                    .insert(word.clone());
            }
            spellings.insert(word.clone(), raw);
            words.insert(word, columns);
        }

        let mut unknown_table_columns = BTreeSet::new();
        for column in reverse.keys() {
            if !column_tables.contains_key(column) {
                column_tables.insert(column.clone(), TableName::unknown());
                unknown_table_columns.insert(column.clone());
            }
        }
        if !unknown_table_columns.is_empty() {
            let sample: Vec<&str> = unknown_table_columns
                .iter()
                .take(UNKNOWN_TABLE_SAMPLE)
                .map(ColumnId::as_str)
                .collect();
            warn!(
                generation = id.get(),
                count = unknown_table_columns.len(),
                sample = ?sample,
                "columns without a table entry mapped to the unknown table"
            );
        }

        let fuzzy = DeletionIndex::build(words.keys(), policy.max_distance());
        debug!(
            generation = id.get(),
            words = words.len(),
            columns = reverse.len(),
            deletion_variants = fuzzy.variant_count(),
            "generation built"
        );

        Ok(Self {
            id,
            words,
            reverse,
            column_tables,
            unknown_table_columns,
            fuzzy,
        })
    }

    /// A generation with no words, used before the first rebuild.
    pub fn empty(id: GenerationId) -> Self {
        Self {
            id,
            words: HashMap::new(),
            reverse: HashMap::new(),
            column_tables: HashMap::new(),
            unknown_table_columns: BTreeSet::new(),
            fuzzy: DeletionIndex::default(),
        }
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    /// Columns mapped to `word`, in build order with duplicates.
    pub fn columns(&self, word: &Word) -> Option<&[ColumnId]> {
        self.words.get(word).map(Vec::as_slice)
    }

    pub fn contains_word(&self, word: &Word) -> bool {
        self.words.contains_key(word)
    }

    /// Words whose mapping lists `column`.
    pub fn words_for(&self, column: &ColumnId) -> Option<&BTreeSet<Word>> {
        self.reverse.get(column)
    }

    /// Table owning `column`. Every indexed column has one, possibly the
    /// unknown sentinel.
    pub fn table_of(&self, column: &ColumnId) -> Option<&TableName> {
        self.column_tables.get(column)
    }

    pub fn unknown_table_columns(&self) -> &BTreeSet<ColumnId> {
        &self.unknown_table_columns
    }

    pub fn fuzzy(&self) -> &DeletionIndex {
        &self.fuzzy
    }

    /// Sorted vocabulary.
    pub fn vocabulary(&self) -> &[Word] {
        self.fuzzy.vocabulary()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        let tables: BTreeSet<&TableName> = self.column_tables.values().collect();
        IndexStats {
            generation: self.id,
            total_words: self.words.len(),
            total_mappings: self.words.values().map(Vec::len).sum(),
            unique_columns: self.reverse.len(),
            tables: tables.len(),
            unknown_table_columns: self.unknown_table_columns.len(),
            deletion_variants: self.fuzzy.variant_count(),
        }
    }
}
