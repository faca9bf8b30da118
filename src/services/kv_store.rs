// src/services/kv_store.rs
// DOCUMENTATION: Key-value store backed by Redis with an in-memory fallback
// PURPOSE: Token blacklist, logout markers, one-time tokens and rate limit counters

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// In-memory entry with optional expiration
#[derive(Clone, Debug)]
struct StoreEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl StoreEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(at) if Instant::now() > at)
    }
}

/// Key-value store
/// DOCUMENTATION: Every command goes to Redis when a connection is configured.
/// When Redis is absent or a command fails, the in-memory map answers instead.
#[derive(Clone)]
pub struct KvStore {
    redis: Option<ConnectionManager>,
    memory: Arc<RwLock<HashMap<String, StoreEntry>>>,
}

impl KvStore {
    pub fn new(redis: Option<ConnectionManager>) -> Self {
        if redis.is_none() {
            log::warn!("Key-value store running in memory only; state is per-process");
        }
        Self {
            redis,
            memory: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store without Redis, used by tests and single-node development
    pub fn in_memory() -> Self {
        Self {
            redis: None,
            memory: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn uses_redis(&self) -> bool {
        self.redis.is_some()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(mut conn) = self.redis.clone() {
            match conn.get::<_, Option<String>>(key).await {
                Ok(value) => return value,
                Err(e) => log::warn!("Redis GET {} failed, using memory: {}", key, e),
            }
        }

        let store = self.memory.read().await;
        store
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Set a value, expiring after `ttl` when given
    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        if let Some(mut conn) = self.redis.clone() {
            let result: redis::RedisResult<()> = match ttl {
                Some(ttl) => conn.set_ex(key, value, ttl.as_secs().max(1)).await,
                None => conn.set(key, value).await,
            };
            match result {
                Ok(()) => return,
                Err(e) => log::warn!("Redis SET {} failed, using memory: {}", key, e),
            }
        }

        let mut store = self.memory.write().await;
        store.insert(key.to_string(), StoreEntry::new(value.to_string(), ttl));
        log::debug!("Memory SET for key: {}", key);
    }

    pub async fn del(&self, key: &str) {
        if let Some(mut conn) = self.redis.clone() {
            let result: redis::RedisResult<()> = conn.del(key).await;
            match result {
                Ok(()) => return,
                Err(e) => log::warn!("Redis DEL {} failed, using memory: {}", key, e),
            }
        }

        self.memory.write().await.remove(key);
    }

    pub async fn exists(&self, key: &str) -> bool {
        if let Some(mut conn) = self.redis.clone() {
            match conn.exists::<_, bool>(key).await {
                Ok(found) => return found,
                Err(e) => log::warn!("Redis EXISTS {} failed, using memory: {}", key, e),
            }
        }

        let store = self.memory.read().await;
        store.get(key).map(|e| !e.is_expired()).unwrap_or(false)
    }

    /// Atomically increment an integer counter, returning the new value
    pub async fn incr(&self, key: &str) -> i64 {
        if let Some(mut conn) = self.redis.clone() {
            match conn.incr::<_, _, i64>(key, 1).await {
                Ok(value) => return value,
                Err(e) => log::warn!("Redis INCR {} failed, using memory: {}", key, e),
            }
        }

        let mut store = self.memory.write().await;
        let entry = store
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_expired() {
                    *entry = StoreEntry::new("0".to_string(), None);
                }
            })
            .or_insert_with(|| StoreEntry::new("0".to_string(), None));

        let next = entry.value.parse::<i64>().unwrap_or(0) + 1;
        entry.value = next.to_string();
        next
    }

    pub async fn expire(&self, key: &str, ttl: Duration) {
        if let Some(mut conn) = self.redis.clone() {
            let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).max(1);
            let result: redis::RedisResult<()> = conn.expire(key, secs).await;
            match result {
                Ok(()) => return,
                Err(e) => log::warn!("Redis EXPIRE {} failed, using memory: {}", key, e),
            }
        }

        let mut store = self.memory.write().await;
        if let Some(entry) = store.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
    }

    /// Round-trip to Redis; Ok(false) when running in memory only
    pub async fn ping(&self) -> Result<bool, String> {
        let Some(mut conn) = self.redis.clone() else {
            return Ok(false);
        };

        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| e.to_string())?;
        Ok(pong == "PONG")
    }

    /// Clear expired in-memory entries
    pub async fn cleanup(&self) {
        let mut store = self.memory.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Store cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    pub async fn stats(&self) -> StoreStats {
        let store = self.memory.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        StoreStats {
            backend: if self.uses_redis() { "redis" } else { "memory" },
            memory_entries: total,
            expired_entries: expired,
        }
    }
}

/// Store statistics
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub backend: &'static str,
    pub memory_entries: usize,
    pub expired_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired in-memory entries
pub fn start_cleanup_task(store: KvStore, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            store.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_del() {
        let store = KvStore::in_memory();

        store.set("key", "value", None).await;
        assert_eq!(store.get("key").await, Some("value".to_string()));
        assert!(store.exists("key").await);

        store.del("key").await;
        assert_eq!(store.get("key").await, None);
        assert!(!store.exists("key").await);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let store = KvStore::in_memory();
        store
            .set("short", "lived", Some(Duration::from_millis(50)))
            .await;

        assert!(store.get("short").await.is_some());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.get("short").await.is_none());
        assert!(!store.exists("short").await);
    }

    #[tokio::test]
    async fn test_incr_and_expire() {
        let store = KvStore::in_memory();

        assert_eq!(store.incr("counter").await, 1);
        assert_eq!(store.incr("counter").await, 2);
        store.expire("counter", Duration::from_millis(50)).await;
        assert_eq!(store.incr("counter").await, 3);

        tokio::time::sleep(Duration::from_millis(120)).await;
        // Expired counters restart from zero
        assert_eq!(store.incr("counter").await, 1);
    }

    #[test]
    fn test_overwrite_clears_ttl() {
        let store = KvStore::in_memory();
        tokio_test::block_on(async {
            store.set("k", "old", Some(Duration::from_millis(10))).await;
            store.set("k", "new", None).await;
            tokio::time::sleep(Duration::from_millis(30)).await;
            assert_eq!(store.get("k").await.as_deref(), Some("new"));
        });
    }

    #[tokio::test]
    async fn test_cleanup_and_stats() {
        let store = KvStore::in_memory();
        store.set("a", "1", Some(Duration::from_millis(20))).await;
        store.set("b", "2", None).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        store.cleanup().await;

        let stats = store.stats().await;
        assert_eq!(stats.backend, "memory");
        assert_eq!(stats.memory_entries, 1);
        assert_eq!(stats.expired_entries, 0);
        assert_eq!(store.ping().await, Ok(false));
    }
}
