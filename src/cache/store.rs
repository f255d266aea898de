//! Concurrency-safe storage for cache entries.

use std::sync::Arc;

use dashmap::DashMap;

use super::CacheEntry;

/// Unordered key → entry map with its own internal synchronization.
///
/// Backed by a sharded [`DashMap`]: lookups clone the entry's [`Arc`] and
/// release the shard immediately, so readers never hold a lock while the
/// caller goes on to read a body. Concurrent stores for the same key race and
/// the last writer wins.
///
/// There is no capacity bound and no eviction; an expired entry stays until a
/// newer one replaces it.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: DashMap<String, Arc<CacheEntry>>,
}

impl CacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry stored under `key`, if any, fresh or not.
    pub fn lookup(&self, key: &str) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Inserts `entry` under `key`, replacing whatever was there.
    pub fn store(&self, key: impl Into<String>, entry: Arc<CacheEntry>) {
        self.entries.insert(key.into(), entry);
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use bytes::Bytes;
    use tokio::time::Instant;

    use super::*;
    use crate::http::{Response, StatusCode};

    fn entry(body: &'static str) -> Arc<CacheEntry> {
        let (head, _) = Response::new(StatusCode::OK).into_parts();
        Arc::new(CacheEntry::captured(
            head,
            Bytes::from_static(body.as_bytes()),
            Instant::now(),
            Duration::from_secs(60),
        ))
    }

    #[test]
    fn lookup_absent_key() {
        let store = CacheStore::new();
        assert!(store.lookup("https://example.com/").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn store_replaces_existing_entry() {
        let store = CacheStore::new();
        store.store("k", entry("old"));
        store.store("k", entry("new"));

        assert_eq!(store.len(), 1);
        assert_eq!(&store.lookup("k").unwrap().body()[..], b"new");
    }

    #[test]
    fn held_entry_survives_replacement() {
        let store = CacheStore::new();
        store.store("k", entry("old"));
        let held = store.lookup("k").unwrap();
        store.store("k", entry("new"));

        assert_eq!(&held.body()[..], b"old");
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let store = Arc::new(CacheStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for n in 0..200 {
                        let key = format!("key-{}", n % 16);
                        if (n + i) % 2 == 0 {
                            store.store(key, entry("value"));
                        } else if let Some(found) = store.lookup(&key) {
                            assert_eq!(&found.body()[..], b"value");
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 16);
    }
}
