use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use axum::body::Bytes;

use crate::config::CacheConfig;

struct CacheEntry {
    body: Bytes,
    stored_at: Instant,
}

/// Process-wide GET response cache keyed by the exact `path?query`
/// string. The allow-list defaults to empty, which makes the whole thing
/// inert; any non-GET request wipes every entry at once (no per-path
/// invalidation).
pub struct ResponseCache {
    ttl: Duration,
    paths: Vec<String>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(cfg: &CacheConfig) -> Self {
        Self {
            ttl: Duration::from_millis(cfg.ttl_ms),
            paths: cfg.paths.clone(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_cacheable(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, body: Bytes) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key,
            CacheEntry {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().expect("cache mutex poisoned").clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;

    use crate::config::CacheConfig;

    use super::ResponseCache;

    fn cache_with(paths: &[&str], ttl_ms: u64) -> ResponseCache {
        ResponseCache::new(&CacheConfig {
            ttl_ms,
            paths: paths.iter().map(|p| p.to_string()).collect(),
        })
    }

    #[test]
    fn allow_list_is_exact_match() {
        let cache = cache_with(&["/user"], 60000);

        assert!(cache.is_cacheable("/user"));
        assert!(!cache.is_cacheable("/user/1"));
        assert!(!cache.is_cacheable("/other"));
    }

    #[test]
    fn default_allow_list_makes_the_cache_inert() {
        let cache = ResponseCache::new(&CacheConfig::default());

        assert!(!cache.is_cacheable("/user"));
    }

    #[test]
    fn entries_are_served_until_the_ttl_elapses() {
        let cache = cache_with(&["/user"], 60000);
        cache.put("/user?page=1".to_string(), Bytes::from_static(b"[1]"));

        assert_eq!(
            cache.get("/user?page=1"),
            Some(Bytes::from_static(b"[1]"))
        );
        assert_eq!(cache.get("/user?page=2"), None);
    }

    #[test]
    fn stale_entries_are_evicted_on_read() {
        let cache = cache_with(&["/user"], 0);
        cache.put("/user".to_string(), Bytes::from_static(b"[]"));

        assert_eq!(cache.get("/user"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn clear_drops_every_key() {
        let cache = cache_with(&["/user", "/other"], 60000);
        cache.put("/user".to_string(), Bytes::from_static(b"[1]"));
        cache.put("/other?q=x".to_string(), Bytes::from_static(b"[2]"));

        cache.clear();

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("/user"), None);
    }
}
