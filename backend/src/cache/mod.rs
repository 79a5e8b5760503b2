//! In-process TTL cache for gallery responses
//!
//! Entries expire lazily: a read at or after `expires_at` behaves like a miss.
//! Nothing is evicted besides expired entries, so the key count grows with the
//! number of distinct folders requested. That set is small in practice.

mod clock;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use common_types::GalleryResponse;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};

struct CacheEntry {
    value: GalleryResponse,
    expires_at: DateTime<Utc>,
}

/// Shared gallery cache, keyed by folder or by the random-mix key
pub struct GalleryCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl GalleryCache {
    /// Creates an empty cache reading time from `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Creates an empty cache backed by the wall clock
    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Returns the cached value for `key` if it has not expired yet
    #[must_use]
    pub fn get(&self, key: &str) -> Option<GalleryResponse> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;

        if now >= entry.expires_at {
            return None;
        }

        Some(entry.value.clone())
    }

    /// Stores `value` under `key` for `ttl`, replacing any previous entry
    pub fn set(&self, key: impl Into<String>, value: GalleryResponse, ttl: Duration) {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Drops every expired entry and returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Periodically purges expired entries until `shutdown` is cancelled
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        every: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            tracing::debug!(removed, "Purged expired gallery cache entries");
                        }
                    }
                }
            }

            tracing::info!("Gallery cache sweeper stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::ImageRecord;
    use pretty_assertions::assert_eq;

    const HOUR: Duration = Duration::from_secs(3600);

    fn response(public_id: &str) -> GalleryResponse {
        GalleryResponse {
            images: vec![ImageRecord {
                public_id: public_id.to_string(),
                url: format!("https://res.example.com/{public_id}.jpg"),
                width: 640,
                height: 480,
                folder: None,
            }],
            next_cursor: None,
        }
    }

    fn cache_with_clock() -> (GalleryCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (GalleryCache::new(clock.clone()), clock)
    }

    #[test]
    fn test_value_readable_until_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.set("gallery_japan", response("a"), HOUR);

        clock.advance(HOUR - Duration::from_secs(1));
        assert_eq!(cache.get("gallery_japan"), Some(response("a")));
    }

    #[test]
    fn test_value_absent_at_exact_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.set("gallery_japan", response("a"), HOUR);

        clock.advance(HOUR);
        assert_eq!(cache.get("gallery_japan"), None);

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("gallery_japan"), None);
    }

    #[test]
    fn test_missing_key() {
        let (cache, _clock) = cache_with_clock();
        assert_eq!(cache.get("gallery_nowhere"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_is_last_write_wins_and_resets_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.set("random_images_cache", response("old"), HOUR);

        clock.advance(Duration::from_secs(1800));
        cache.set("random_images_cache", response("new"), HOUR);

        clock.advance(Duration::from_secs(1800));
        assert_eq!(cache.get("random_images_cache"), Some(response("new")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_never_readable() {
        let (cache, _clock) = cache_with_clock();
        cache.set("gallery_japan", response("a"), Duration::ZERO);
        assert_eq!(cache.get("gallery_japan"), None);
    }

    #[test]
    fn test_purge_only_removes_expired_entries() {
        let (cache, clock) = cache_with_clock();
        cache.set("gallery_short", response("a"), Duration::from_secs(60));
        cache.set("gallery_long", response("b"), HOUR);

        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("gallery_long"), Some(response("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_on_cancel() {
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(GalleryCache::new(clock.clone()));
        cache.set("gallery_short", response("a"), Duration::from_secs(1));
        clock.advance(Duration::from_secs(5));

        let token = CancellationToken::new();
        let handle = cache.spawn_sweeper(Duration::from_secs(10), token.clone());

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(cache.is_empty());

        token.cancel();
        handle.await.unwrap();
    }
}
