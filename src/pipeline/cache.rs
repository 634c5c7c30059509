//! Parsed-document cache shared by every request of a pipeline

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use uuid::Uuid;

use crate::language::Document;
use crate::schema::Schema;

/// Exact request text, scoped to the schema it was parsed for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    schema: Uuid,
    text: String,
}

impl CacheKey {
    fn new(schema: &Schema, text: &str) -> Self {
        Self {
            schema: schema.id(),
            text: text.to_string(),
        }
    }
}

enum Entries {
    Unbounded(RwLock<HashMap<CacheKey, Arc<Document>>>),
    Bounded(Mutex<LruCache<CacheKey, Arc<Document>>>),
}

/// Point-in-time counters for a [`DocumentCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Maps request text to the tree parsed from it.
///
/// Only successful parses are stored, and a stored tree is never replaced:
/// [`DocumentCache::store`] hands back whichever tree got there first.
/// Unbounded unless built with [`DocumentCache::bounded`].
pub struct DocumentCache {
    entries: Entries,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::with_entries(Entries::Unbounded(RwLock::new(HashMap::new())))
    }

    /// Keep at most `capacity` trees, evicting the least recently used.
    /// A capacity of zero is treated as one.
    pub fn bounded(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self::with_entries(Entries::Bounded(Mutex::new(LruCache::new(capacity))))
    }

    fn with_entries(entries: Entries) -> Self {
        Self {
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn lookup(&self, schema: &Schema, text: &str) -> Option<Arc<Document>> {
        let key = CacheKey::new(schema, text);
        let found = match &self.entries {
            Entries::Unbounded(map) => map.read().get(&key).cloned(),
            Entries::Bounded(lru) => lru.lock().get(&key).cloned(),
        };

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a freshly parsed tree and return the canonical one for `text`
    pub fn store(&self, schema: &Schema, text: &str, document: Document) -> Arc<Document> {
        let key = CacheKey::new(schema, text);
        match &self.entries {
            Entries::Unbounded(map) => map
                .write()
                .entry(key)
                .or_insert_with(|| Arc::new(document))
                .clone(),
            Entries::Bounded(lru) => {
                let mut lru = lru.lock();
                if let Some(existing) = lru.get(&key) {
                    return existing.clone();
                }
                let document = Arc::new(document);
                lru.put(key, document.clone());
                document
            }
        }
    }

    pub fn contains(&self, schema: &Schema, text: &str) -> bool {
        let key = CacheKey::new(schema, text);
        match &self.entries {
            Entries::Unbounded(map) => map.read().contains_key(&key),
            Entries::Bounded(lru) => lru.lock().contains(&key),
        }
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            Entries::Unbounded(map) => map.read().len(),
            Entries::Bounded(lru) => lru.lock().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured bound, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        match &self.entries {
            Entries::Unbounded(_) => None,
            Entries::Bounded(lru) => Some(lru.lock().cap().get()),
        }
    }

    pub fn clear(&self) {
        match &self.entries {
            Entries::Unbounded(map) => map.write().clear(),
            Entries::Bounded(lru) => lru.lock().clear(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("capacity", &self.capacity())
            .field("stats", &self.stats())
            .finish()
    }
}
