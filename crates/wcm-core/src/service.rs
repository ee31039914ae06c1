//! Query facade over the published generation.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use wcm_map::{
    ConfidencePolicy, Generation, GenerationId, IndexSource, IndexStats, LengthNormalized,
    QueryEngine,
};
use wcm_model::{
    ColumnId, Result, SearchOptions, SearchResponse, SetOperation, SetOperationResult, TableName,
    Word,
};

use crate::cache::{CacheKey, NoCache, ResultCache};
use crate::coordinator::IndexCoordinator;
use crate::ranking::{TableRanking, rank_tables};
use crate::relationships::{RelationshipGraph, TraversalResult, traverse};

/// Entry point for transports: every query runs against one generation
/// snapshot, with an optional result cache in front.
pub struct MapperService {
    coordinator: IndexCoordinator,
    options: SearchOptions,
    policy: Arc<dyn ConfidencePolicy>,
    cache: Arc<dyn ResultCache>,
}

impl MapperService {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            coordinator: IndexCoordinator::new(options.edit_distance),
            options,
            policy: Arc::new(LengthNormalized),
            cache: Arc::new(NoCache),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn ConfidencePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn coordinator(&self) -> &IndexCoordinator {
        &self.coordinator
    }

    pub fn rebuild(&self, source: IndexSource, graph: Option<RelationshipGraph>) -> Result<GenerationId> {
        self.coordinator.rebuild(source, graph)
    }

    pub fn refresh_graph(&self, graph: RelationshipGraph) {
        self.coordinator.refresh_graph(graph);
    }

    pub fn stats(&self) -> IndexStats {
        self.coordinator.current_generation().stats()
    }

    fn engine<'a>(&'a self, generation: &'a Generation) -> QueryEngine<'a> {
        QueryEngine::new(generation, &self.options).with_policy(self.policy.as_ref())
    }

    pub fn search(&self, raw: &str, include_suggestions: bool) -> Result<SearchResponse> {
        if raw.trim().is_empty() {
            return Ok(SearchResponse::empty(raw));
        }
        let generation = self.coordinator.current_generation();
        let key = CacheKey::new(
            "search",
            generation.id(),
            format!("{}|{include_suggestions}", Word::new(raw)),
        );
        let mut response = self.cached(key, || {
            self.engine(&generation).search(raw, include_suggestions)
        })?;
        response.query = raw.to_string();
        Ok(response)
    }

    pub fn reverse(&self, column: &ColumnId) -> Result<BTreeSet<Word>> {
        let generation = self.coordinator.current_generation();
        let key = CacheKey::new("reverse", generation.id(), column.as_str());
        self.cached(key, || {
            self.engine(&generation).reverse_lookup(column).cloned()
        })
    }

    pub fn set_operation<S: AsRef<str>>(
        &self,
        words: &[S],
        operation: SetOperation,
    ) -> Result<SetOperationResult> {
        let generation = self.coordinator.current_generation();
        let key = CacheKey::new(operation.as_str(), generation.id(), encode_words(words));
        let mut result = self.cached(key, || {
            self.engine(&generation).set_operation(words, operation)
        })?;
        // Entries are shared across spellings; report this caller's spelling.
        let unresolved: HashSet<Word> = result.unresolved.iter().map(|raw| Word::new(raw)).collect();
        result.unresolved = words
            .iter()
            .map(AsRef::as_ref)
            .filter(|raw| unresolved.contains(&Word::new(raw)))
            .map(str::to_string)
            .collect();
        Ok(result)
    }

    /// Ranks the tables owning `columns` in the current generation.
    pub fn rank(&self, columns: &[(Word, ColumnId)]) -> TableRanking {
        rank_tables(&self.coordinator.current_generation(), columns)
    }

    /// Resolves `words`, combines them with `operation` and ranks the
    /// resulting tables, all against one generation. A single resolved word
    /// is enough.
    pub fn rank_words<S: AsRef<str>>(
        &self,
        words: &[S],
        operation: SetOperation,
    ) -> Result<(SetOperationResult, TableRanking)> {
        let generation = self.coordinator.current_generation();
        let selection = self.engine(&generation).combine(words, operation)?;
        let ranking = rank_tables(&generation, &selection.column_pairs());
        Ok((selection, ranking))
    }

    /// Expands `frequencies` over the current relationship graph.
    pub fn traverse(&self, frequencies: &BTreeMap<TableName, usize>, max_depth: usize) -> TraversalResult {
        let graph = self.coordinator.current_graph();
        traverse(frequencies, Some(graph.as_ref()), max_depth)
    }

    fn cached<T, F>(&self, key: CacheKey, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        match self.cache.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(%key, "cache hit");
                    return Ok(value);
                }
                Err(error) => warn!(%key, %error, "discarding undecodable cache entry"),
            },
            Ok(None) => {}
            Err(error) => warn!(%key, %error, "cache read failed"),
        }

        let value = compute()?;
        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(error) = self.cache.put(key, raw) {
                    warn!(%error, "cache write failed");
                }
            }
            Err(error) => warn!(%key, %error, "result could not be encoded for the cache"),
        }
        Ok(value)
    }
}

/// Normalized words as length-prefixed parts, so no choice of words can
/// collide with another.
fn encode_words<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|raw| {
            let word = Word::new(raw.as_ref());
            format!("{}:{word}", word.as_str().len())
        })
        .collect()
}

impl Default for MapperService {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}
