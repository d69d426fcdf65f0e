//! Two-tier duplicate suppression: an in-process seen-set backed by an
//! optional shared, TTL-bounded set.

mod redis_store;
mod store;
mod suppressor;

pub use redis_store::RedisSeenStore;
pub use store::{MemorySeenStore, SeenStore};
pub use suppressor::{connect_shared_tier, DuplicateSuppressor, SharedTier};
