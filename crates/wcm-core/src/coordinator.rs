//! Publication of index generations.
//!
//! Readers load the current generation with a single atomic load and keep
//! their `Arc` for as long as they need it. A rebuild constructs the next
//! generation off to the side and publishes it with one pointer swap; the
//! previous generation is freed when its last reader drops it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arc_swap::ArcSwap;
use tracing::{info, info_span, warn};

use wcm_map::{Generation, GenerationId, IndexSource};
use wcm_model::{EditDistancePolicy, MapperError, Result};

use crate::relationships::RelationshipGraph;

/// Holds the published generation and relationship graph.
#[derive(Debug)]
pub struct IndexCoordinator {
    generation: ArcSwap<Generation>,
    graph: ArcSwap<RelationshipGraph>,
    rebuilding: AtomicBool,
    next_id: AtomicU64,
    policy: EditDistancePolicy,
}

/// Exclusive right to rebuild. Released on drop.
#[derive(Debug)]
#[must_use]
pub struct RebuildGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl IndexCoordinator {
    /// Starts with an empty generation 0 and an empty graph.
    pub fn new(policy: EditDistancePolicy) -> Self {
        Self {
            generation: ArcSwap::from_pointee(Generation::empty(GenerationId::new(0))),
            graph: ArcSwap::from_pointee(RelationshipGraph::default()),
            rebuilding: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            policy,
        }
    }

    pub fn policy(&self) -> &EditDistancePolicy {
        &self.policy
    }

    /// The active generation. Never blocks.
    pub fn current_generation(&self) -> Arc<Generation> {
        self.generation.load_full()
    }

    pub fn current_graph(&self) -> Arc<RelationshipGraph> {
        self.graph.load_full()
    }

    /// Publishes `generation` as-is and returns the one it replaced.
    ///
    /// Later rebuilds are numbered above the swapped-in id.
    pub fn swap(&self, generation: Generation) -> Arc<Generation> {
        self.next_id
            .fetch_max(generation.id().get() + 1, Ordering::AcqRel);
        self.generation.swap(Arc::new(generation))
    }

    /// Replaces the relationship graph without touching the word index.
    pub fn refresh_graph(&self, graph: RelationshipGraph) -> Arc<RelationshipGraph> {
        info!(
            tables = graph.table_count(),
            edges = graph.edge_count(),
            "relationship graph refreshed"
        );
        self.graph.swap(Arc::new(graph))
    }

    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding.load(Ordering::Acquire)
    }

    /// Claims the rebuild slot, failing if another rebuild holds it.
    pub fn begin_rebuild(&self) -> Result<RebuildGuard<'_>> {
        self.rebuilding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| RebuildGuard {
                flag: &self.rebuilding,
            })
            .map_err(|_| {
                warn!("rebuild rejected, another rebuild is in progress");
                MapperError::RebuildInProgress
            })
    }

    /// Builds and publishes a new generation, plus a new graph if given.
    ///
    /// On a validation failure nothing is published and the previous
    /// generation keeps serving.
    pub fn rebuild(&self, source: IndexSource, graph: Option<RelationshipGraph>) -> Result<GenerationId> {
        let _guard = self.begin_rebuild()?;
        self.rebuild_locked(source, graph)
    }

    fn rebuild_locked(&self, source: IndexSource, graph: Option<RelationshipGraph>) -> Result<GenerationId> {
        let id = GenerationId::new(self.next_id.fetch_add(1, Ordering::AcqRel));
        let span = info_span!("rebuild", generation = id.get());
        let _enter = span.enter();

        let generation = Generation::build(id, source, &self.policy).inspect_err(|error| {
            warn!(%error, "rebuild rejected, previous generation keeps serving");
        })?;
        let stats = generation.stats();
        let previous = self.generation.swap(Arc::new(generation));
        if let Some(graph) = graph {
            self.refresh_graph(graph);
        }
        info!(
            previous = previous.id().get(),
            words = stats.total_words,
            columns = stats.unique_columns,
            tables = stats.tables,
            "generation published"
        );
        Ok(id)
    }
}

impl Default for IndexCoordinator {
    fn default() -> Self {
        Self::new(EditDistancePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_rebuild_is_rejected_while_one_holds_the_slot() {
        let coordinator = IndexCoordinator::default();
        let guard = coordinator.begin_rebuild().expect("first claim");
        assert!(coordinator.is_rebuilding());

        let error = coordinator
            .rebuild(IndexSource::new().with_word("date", &["c1"]), None)
            .unwrap_err();
        assert_eq!(error, MapperError::RebuildInProgress);
        assert_eq!(coordinator.current_generation().id(), GenerationId::new(0));

        drop(guard);
        assert!(!coordinator.is_rebuilding());
        let id = coordinator
            .rebuild(IndexSource::new().with_word("date", &["c1"]), None)
            .expect("rebuild after release");
        assert_eq!(coordinator.current_generation().id(), id);
    }

    #[test]
    fn failed_rebuild_releases_the_slot() {
        let coordinator = IndexCoordinator::default();
        let error = coordinator
            .rebuild(IndexSource::new().with_word("date", &[]), None)
            .unwrap_err();
        assert!(matches!(error, MapperError::Validation(_)));
        assert!(!coordinator.is_rebuilding());
        assert!(coordinator.current_generation().is_empty());
    }

    #[test]
    fn swap_advances_future_ids() {
        let coordinator = IndexCoordinator::default();
        coordinator.swap(Generation::empty(GenerationId::new(7)));
        let id = coordinator
            .rebuild(IndexSource::new().with_word("date", &["c1"]), None)
            .expect("rebuild");
        assert_eq!(id, GenerationId::new(8));
    }
}
