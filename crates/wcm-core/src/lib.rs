#![deny(unsafe_code)]

pub mod cache;
pub mod coordinator;
pub mod ranking;
pub mod relationships;
pub mod service;

pub use cache::{CacheError, CacheKey, CacheSettings, MemoryCache, NoCache, ResultCache};
pub use coordinator::{IndexCoordinator, RebuildGuard};
pub use ranking::{
    KeywordCoverage, RankingSummary, TableRankEntry, TableRanking, percentage, rank_tables,
};
pub use relationships::{RelationshipGraph, TraversalResult, traverse};
pub use service::MapperService;

/// Default number of hops for relationship expansion.
pub const DEFAULT_MAX_DEPTH: usize = 2;
