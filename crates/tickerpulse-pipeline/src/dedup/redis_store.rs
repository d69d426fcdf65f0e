//! Redis-backed shared seen-set.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::store::SeenStore;
use crate::error::StoreError;

/// Shared seen-set held in Redis sets (`SADD` / `EXPIRE`).
///
/// Every command is bounded by the same timeout as the connect, so a server
/// that stops answering surfaces as [`StoreError::Timeout`].
#[derive(Clone)]
pub struct RedisSeenStore {
    conn: MultiplexedConnection,
    timeout: Duration,
}

impl std::fmt::Debug for RedisSeenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSeenStore")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RedisSeenStore {
    /// Open a multiplexed connection and verify it with `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redis`] if the URL is invalid or the server
    /// rejects the connection, and [`StoreError::Timeout`] if connecting or
    /// pinging takes longer than `timeout`.
    pub async fn connect(redis_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;

        let mut conn = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| StoreError::Timeout(timeout))??;

        let pong: String = tokio::time::timeout(
            timeout,
            redis::cmd("PING").query_async::<_, String>(&mut conn),
        )
        .await
        .map_err(|_| StoreError::Timeout(timeout))??;
        tracing::debug!(reply = %pong, "Redis ping ok");

        Ok(Self { conn, timeout })
    }
}

#[async_trait]
impl SeenStore for RedisSeenStore {
    async fn add_if_absent(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let added: i64 = tokio::time::timeout(self.timeout, conn.sadd(key, member))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))??;
        Ok(added == 1)
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        #[allow(clippy::cast_possible_wrap)]
        let seconds = ttl.as_secs() as i64;
        tokio::time::timeout(self.timeout, conn.expire::<_, ()>(key, seconds))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))??;
        Ok(())
    }
}
