// Process-wide cache of provider responses keyed by tag.
//
// Entries are never evicted by the store itself. Freshness is decided at read
// time against the configured TTL, and a stale entry stays in place until the
// next successful fetch for the same tag overwrites it.
use crate::metrics_defs::{CACHE_HIT, CACHE_MISS, CACHE_STALE};
use crate::types::Post;
use moka::sync::Cache;
use shared::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_TTL_SECS: u64 = 5;

#[derive(Clone, Debug)]
struct CacheEntry {
    fetched_at: Instant,
    posts: Arc<[Post]>,
}

/// The result of a cache read.
#[derive(Clone, Debug)]
pub struct CachedPosts {
    pub posts: Arc<[Post]>,
    pub fresh: bool,
}

pub struct PostCache {
    entries: Cache<String, CacheEntry>,
    ttl: Duration,
}

impl PostCache {
    pub fn new(ttl: Duration) -> Self {
        // No capacity or time based eviction on the moka side, the map only
        // provides concurrent access. Staleness is evaluated in `get`.
        let entries = Cache::builder().build();

        PostCache { entries, ttl }
    }

    /// Returns the stored posts for `tag`, if any, and whether they are still fresh.
    pub fn get(&self, tag: &str) -> Option<CachedPosts> {
        let Some(entry) = self.entries.get(tag) else {
            counter!(CACHE_MISS).increment(1);
            return None;
        };

        let fresh = entry.fetched_at.elapsed() < self.ttl;
        let metric_def = if fresh { CACHE_HIT } else { CACHE_STALE };
        counter!(metric_def).increment(1);

        Some(CachedPosts {
            posts: entry.posts,
            fresh,
        })
    }

    /// Replaces the entry for `tag`, stamped with the current time.
    /// Concurrent writers to the same tag race, the last one wins.
    pub fn put(&self, tag: &str, posts: Arc<[Post]>) {
        self.put_at(tag, posts, Instant::now());
    }

    pub(crate) fn put_at(&self, tag: &str, posts: Arc<[Post]>, fetched_at: Instant) {
        self.entries
            .insert(tag.to_string(), CacheEntry { fetched_at, posts });
    }
}

impl Default for PostCache {
    fn default() -> Self {
        PostCache::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}
