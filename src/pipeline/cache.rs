//! Per-source response cache.
//!
//! Entries expire lazily: a lookup older than the window reports a miss and
//! the caller repopulates. Expired entries are kept so a failing source can
//! still fall back to its last good response.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::services::SourcePayload;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: SourcePayload,
    stored_at: Instant,
}

/// Time-boxed memo keyed by source name.
#[derive(Debug)]
pub struct SourceCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SourceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached payload for `key` if it was stored less than `ttl` ago.
    pub fn get(&self, key: &str) -> Option<SourcePayload> {
        self.get_at(key, Instant::now())
    }

    /// Store `data` under `key`, replacing any previous entry.
    pub fn put(&self, key: &str, data: SourcePayload) {
        self.put_at(key, data, Instant::now());
    }

    /// Cached payload for `key` regardless of age.
    pub fn get_stale(&self, key: &str) -> Option<SourcePayload> {
        self.lock().get(key).map(|entry| entry.data.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<SourcePayload> {
        let entries = self.lock();
        let entry = entries.get(key)?;
        (now.saturating_duration_since(entry.stored_at) < self.ttl).then(|| entry.data.clone())
    }

    fn put_at(&self, key: &str, data: SourcePayload, now: Instant) {
        self.lock().insert(
            key.to_string(),
            CacheEntry {
                data,
                stored_at: now,
            },
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsItem;

    fn payload(title: &str) -> SourcePayload {
        SourcePayload::News(vec![NewsItem {
            id: title.to_lowercase(),
            title: title.to_string(),
            description: "No description".into(),
            url: "https://example.com".into(),
            published: "2024-06-01T00:00:00Z".into(),
            source: "example.com".into(),
            score: None,
            comments: None,
            author: None,
            flair: None,
        }])
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let cache = SourceCache::new(Duration::from_secs(1800));
        assert!(cache.get("github").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_inside_window_is_idempotent() {
        let cache = SourceCache::new(Duration::from_secs(1800));
        cache.put("reddit", payload("One"));

        let first = cache.get("reddit");
        let second = cache.get("reddit");
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_expiry_is_lazy() {
        let cache = SourceCache::new(Duration::from_secs(1800));
        let stored = Instant::now();
        cache.put_at("rss", payload("Old"), stored);

        let inside = stored + Duration::from_secs(1799);
        let outside = stored + Duration::from_secs(1800);
        assert!(cache.get_at("rss", inside).is_some());
        assert!(cache.get_at("rss", outside).is_none());

        // Still present for stale fallback.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_stale("rss"), Some(payload("Old")));
    }

    #[test]
    fn test_put_replaces_and_clear_empties() {
        let cache = SourceCache::new(Duration::from_secs(60));
        cache.put("hn", payload("First"));
        cache.put("hn", payload("Second"));
        assert_eq!(cache.get("hn"), Some(payload("Second")));

        cache.clear();
        assert!(cache.get_stale("hn").is_none());
    }
}
