//! Best-effort result cache.
//!
//! The service reads through and writes through a [`ResultCache`]. Entries are
//! JSON strings keyed by operation, generation id and normalized arguments, so
//! publishing a new generation never serves stale results. Any cache failure
//! is treated as a miss.

use std::fmt;
use std::time::Duration;

use mini_moka::sync::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wcm_map::GenerationId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    generation: GenerationId,
    arguments: String,
}

impl CacheKey {
    pub fn new(operation: &'static str, generation: GenerationId, arguments: impl Into<String>) -> Self {
        Self {
            operation,
            generation,
            arguments: arguments.into(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn generation(&self) -> GenerationId {
        self.generation
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.operation, self.generation, self.arguments)
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache entry is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Key-value store for serialized query results.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;
    fn put(&self, key: CacheKey, value: String) -> Result<(), CacheError>;
}

/// A cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl ResultCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn put(&self, _key: CacheKey, _value: String) -> Result<(), CacheError> {
        Ok(())
    }
}

/// In-process cache bounded by entry count and time to live.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<CacheKey, String>,
}

impl MemoryCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key))
    }

    fn put(&self, key: CacheKey, value: String) -> Result<(), CacheError> {
        self.entries.insert(key, value);
        Ok(())
    }
}

/// `[cache]` settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub max_entries: u64,
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
            ttl_seconds: 300,
        }
    }
}

impl CacheSettings {
    /// The configured cache, or `None` when caching is disabled.
    pub fn build(&self) -> Option<MemoryCache> {
        self.enabled
            .then(|| MemoryCache::new(self.max_entries, Duration::from_secs(self.ttl_seconds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cache_round_trip() {
        let cache = MemoryCache::new(16, Duration::from_secs(60));
        let key = CacheKey::new("search", GenerationId::new(1), "date|false");
        assert_eq!(cache.get(&key).expect("get"), None);
        cache.put(key.clone(), "{}".to_string()).expect("put");
        assert_eq!(cache.get(&key).expect("get").as_deref(), Some("{}"));
    }

    #[test]
    fn keys_differ_by_generation() {
        let cache = MemoryCache::new(16, Duration::from_secs(60));
        cache
            .put(CacheKey::new("search", GenerationId::new(1), "date"), "1".to_string())
            .expect("put");
        let next = CacheKey::new("search", GenerationId::new(2), "date");
        assert_eq!(cache.get(&next).expect("get"), None);
        assert_eq!(next.to_string(), "search:2:date");
    }

    #[test]
    fn disabled_settings_build_nothing() {
        let settings = CacheSettings {
            enabled: false,
            ..CacheSettings::default()
        };
        assert!(settings.build().is_none());
        assert!(CacheSettings::default().build().is_some());
    }
}
