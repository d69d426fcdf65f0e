//! Seen-set storage seam and its in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// A shared set store keyed per source.
///
/// Membership is decided by the store's own atomic add, never by a
/// read-then-write from this process, so several producers may share a key.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Add `member` to the set at `key`. Returns `true` if it was newly inserted.
    async fn add_if_absent(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Reset the expiry of the whole set at `key`.
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: SeenStore + ?Sized> SeenStore for Arc<T> {
    async fn add_if_absent(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        (**self).add_if_absent(key, member).await
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        (**self).set_expiry(key, ttl).await
    }
}

/// In-memory [`SeenStore`] for tests and single-host runs.
///
/// Expiry is recorded but not enforced. [`MemorySeenStore::set_available`]
/// simulates an outage: while unavailable every call fails.
/// [`MemorySeenStore::set_expiry_available`] fails only `set_expiry`.
#[derive(Debug)]
pub struct MemorySeenStore {
    sets: Mutex<HashMap<String, HashSet<String>>>,
    expiries: Mutex<HashMap<String, Duration>>,
    available: AtomicBool,
    expiry_available: AtomicBool,
}

impl Default for MemorySeenStore {
    fn default() -> Self {
        Self {
            sets: Mutex::new(HashMap::new()),
            expiries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            expiry_available: AtomicBool::new(true),
        }
    }
}

impl MemorySeenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_expiry_available(&self, available: bool) {
        self.expiry_available.store(available, Ordering::SeqCst);
    }

    /// Last expiry set on `key`, if any.
    #[must_use]
    pub fn expiry(&self, key: &str) -> Option<Duration> {
        self.expiries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .copied()
    }

    #[must_use]
    pub fn members(&self, key: &str) -> usize {
        self.sets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .map_or(0, HashSet::len)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store marked unavailable".to_string()))
        }
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    async fn add_if_absent(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut sets = self
            .sets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        self.check_available()?;
        if !self.expiry_available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("expiry marked unavailable".to_string()));
        }
        self.expiries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), ttl);
        Ok(())
    }
}
