//! Loaded schema caching
//!
//! LRU cache of parsed ontology schemas keyed by source.
//! Thread-safe with parking_lot RwLock. Atomic counters for metrics.

use crate::error::SchemaLoadError;
use crate::ontology::schema::{OntologySchema, SchemaSource};
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of schemas kept in memory
pub const DEFAULT_SCHEMA_CACHE_CAPACITY: usize = 8;

/// Process-wide schema cache
pub static SCHEMA_CACHE: Lazy<SchemaCache> = Lazy::new(SchemaCache::default);

/// Schema cache with LRU eviction
pub struct SchemaCache {
    /// Cache storage (RwLock for concurrent reads)
    cache: RwLock<LruCache<String, Arc<OntologySchema>>>,
    /// Cache hits
    hits: AtomicU64,
    /// Cache misses
    misses: AtomicU64,
}

impl SchemaCache {
    /// Create new schema cache with capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Insert schema into cache
    pub fn insert(&self, key: impl Into<String>, schema: OntologySchema) -> Arc<OntologySchema> {
        let schema = Arc::new(schema);
        let mut cache = self.cache.write();
        cache.put(key.into(), schema.clone());
        schema
    }

    /// Get schema from cache
    pub fn get(&self, key: &str) -> Option<Arc<OntologySchema>> {
        let mut cache = self.cache.write();
        if let Some(schema) = cache.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(schema.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Return the cached schema for `source`, loading it on a miss.
    ///
    /// Two concurrent misses for the same source may both load; the later
    /// insert wins.
    pub async fn get_or_load(
        &self,
        source: &SchemaSource,
    ) -> Result<Arc<OntologySchema>, SchemaLoadError> {
        let key = source.cache_key();
        if let Some(schema) = self.get(&key) {
            crate::log_cache_operation!(hit, key, "schema served from cache");
            return Ok(schema);
        }

        crate::log_cache_operation!(miss, key, "loading schema");
        let schema = source.load().await?;
        Ok(self.insert(key, schema))
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.read();
        CacheStats {
            size: cache.len(),
            capacity: cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Clear cache
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        cache.clear();
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_CACHE_CAPACITY)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
