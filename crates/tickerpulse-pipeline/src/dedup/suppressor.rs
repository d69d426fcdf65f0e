//! Per-run duplicate decisions over a local set and an optional shared tier.

use std::collections::HashSet;
use std::time::Duration;

use super::redis_store::RedisSeenStore;
use super::store::SeenStore;

/// Capability state of the shared tier, decided once at startup.
#[derive(Debug)]
pub enum SharedTier<S> {
    /// Shared store reachable; `is_new` consults it atomically.
    Connected(S),
    /// No store configured, or the startup check failed. Local-only for the run.
    Degraded,
}

impl<S> SharedTier<S> {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, SharedTier::Connected(_))
    }
}

/// Check the shared store once. Any failure degrades to local-only
/// deduplication for the whole run; it is never retried.
pub async fn connect_shared_tier(
    redis_url: Option<&str>,
    timeout: Duration,
) -> SharedTier<RedisSeenStore> {
    let Some(url) = redis_url else {
        tracing::info!("no shared seen-store configured; deduplicating locally");
        return SharedTier::Degraded;
    };

    match RedisSeenStore::connect(url, timeout).await {
        Ok(store) => {
            tracing::info!("connected to Redis seen-store");
            SharedTier::Connected(store)
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                "Redis connection failed; falling back to local deduplication"
            );
            SharedTier::Degraded
        }
    }
}

/// Decides exactly once per post id whether it has already been forwarded.
#[derive(Debug)]
pub struct DuplicateSuppressor<S> {
    key: String,
    ttl: Duration,
    local: HashSet<String>,
    shared: SharedTier<S>,
}

impl<S: SeenStore> DuplicateSuppressor<S> {
    /// `key` scopes the shared set to one source (e.g. one subreddit).
    /// `ttl` is reapplied to the whole shared set on every new insertion.
    pub fn new(key: impl Into<String>, ttl: Duration, shared: SharedTier<S>) -> Self {
        Self {
            key: key.into(),
            ttl,
            local: HashSet::new(),
            shared,
        }
    }

    /// Local-only suppressor with no shared tier.
    pub fn local_only(key: impl Into<String>) -> Self {
        Self::new(key, Duration::ZERO, SharedTier::Degraded)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.shared.is_connected()
    }

    /// Number of ids recorded in the in-process set.
    #[must_use]
    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Returns `true` the first time `post_id` is seen, `false` afterwards.
    ///
    /// Shared-store failures never escape: the call falls back to the local
    /// set and still returns a correct local answer.
    pub async fn is_new(&mut self, post_id: &str) -> bool {
        if self.local.contains(post_id) {
            tracing::debug!(post_id, "local duplicate");
            return false;
        }

        if let SharedTier::Connected(store) = &self.shared {
            match store.add_if_absent(&self.key, post_id).await {
                Ok(true) => {
                    tracing::debug!(post_id, "shared store added new id");
                    if let Err(e) = store.set_expiry(&self.key, self.ttl).await {
                        tracing::warn!(
                            post_id,
                            key = %self.key,
                            error = %e,
                            "failed to refresh seen-set expiry"
                        );
                    }
                    self.local.insert(post_id.to_string());
                    return true;
                }
                Ok(false) => {
                    tracing::debug!(post_id, "shared store duplicate");
                    // Short-circuits later repeats without a round trip.
                    self.local.insert(post_id.to_string());
                    return false;
                }
                Err(e) => {
                    tracing::warn!(
                        post_id,
                        error = %e,
                        "shared store error; using local set"
                    );
                }
            }
        }

        self.local.insert(post_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dedup::MemorySeenStore;

    const TTL: Duration = Duration::from_secs(7 * 24 * 3600);

    fn shared(store: &Arc<MemorySeenStore>) -> DuplicateSuppressor<Arc<MemorySeenStore>> {
        DuplicateSuppressor::new(
            "reddit:seen_posts:wallstreetbets",
            TTL,
            SharedTier::Connected(Arc::clone(store)),
        )
    }

    #[tokio::test]
    async fn local_only_is_idempotent() {
        let mut suppressor = DuplicateSuppressor::<MemorySeenStore>::local_only("k");
        assert!(suppressor.is_new("abc").await);
        assert!(!suppressor.is_new("abc").await);
        assert!(suppressor.is_new("def").await);
        assert_eq!(suppressor.local_len(), 2);
        assert!(!suppressor.is_shared());
    }

    #[tokio::test]
    async fn new_id_refreshes_shared_ttl() {
        let store = Arc::new(MemorySeenStore::new());
        let mut suppressor = shared(&store);
        assert!(suppressor.is_new("abc").await);
        assert_eq!(store.expiry("reddit:seen_posts:wallstreetbets"), Some(TTL));
        assert_eq!(store.members("reddit:seen_posts:wallstreetbets"), 1);
    }

    #[tokio::test]
    async fn cooperating_suppressors_yield_one_true() {
        let store = Arc::new(MemorySeenStore::new());
        let mut first = shared(&store);
        let mut second = shared(&store);
        assert!(first.is_new("abc").await);
        assert!(!second.is_new("abc").await);
        assert!(!first.is_new("abc").await);
        assert!(!second.is_new("abc").await);
    }

    #[tokio::test]
    async fn shared_duplicate_is_cached_locally() {
        let store = Arc::new(MemorySeenStore::new());
        let mut first = shared(&store);
        let mut second = shared(&store);
        assert!(first.is_new("abc").await);
        assert!(!second.is_new("abc").await);

        // With the store down, the cached local entry still answers.
        store.set_available(false);
        assert!(!second.is_new("abc").await);
    }

    #[tokio::test]
    async fn outage_falls_back_to_local_answers() {
        let store = Arc::new(MemorySeenStore::new());
        let mut suppressor = shared(&store);
        store.set_available(false);

        assert!(suppressor.is_new("abc").await);
        assert!(!suppressor.is_new("abc").await);
        assert!(suppressor.is_new("def").await);
        assert_eq!(store.members("reddit:seen_posts:wallstreetbets"), 0);

        // Shared tier stays enabled; later calls use it again once it recovers.
        store.set_available(true);
        assert!(suppressor.is_new("ghi").await);
        assert_eq!(store.members("reddit:seen_posts:wallstreetbets"), 1);
    }

    #[tokio::test]
    async fn expiry_failure_still_counts_as_new() {
        let store = Arc::new(MemorySeenStore::new());
        store.set_expiry_available(false);
        let mut suppressor = shared(&store);

        assert!(suppressor.is_new("abc").await);
        assert_eq!(suppressor.local_len(), 1);
        assert_eq!(store.members("reddit:seen_posts:wallstreetbets"), 1);
        assert_eq!(store.expiry("reddit:seen_posts:wallstreetbets"), None);

        // Answered from the local set without touching the store again.
        store.set_available(false);
        assert!(!suppressor.is_new("abc").await);
    }

    #[tokio::test]
    async fn degraded_tier_never_touches_store() {
        let mut suppressor: DuplicateSuppressor<Arc<MemorySeenStore>> =
            DuplicateSuppressor::new("k", TTL, SharedTier::Degraded);
        assert!(suppressor.is_new("abc").await);
        assert!(!suppressor.is_new("abc").await);
    }

    #[tokio::test]
    async fn connect_without_url_is_degraded() {
        let tier = connect_shared_tier(None, Duration::from_secs(1)).await;
        assert!(!tier.is_connected());
    }

    #[tokio::test]
    async fn connect_with_invalid_url_is_degraded() {
        let tier = connect_shared_tier(Some("not-a-redis-url"), Duration::from_secs(1)).await;
        assert!(!tier.is_connected());
    }
}
