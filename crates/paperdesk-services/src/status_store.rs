//! Batch status store
//!
//! Key-value store holding one JSON progress snapshot per batch ID with a
//! fixed TTL. A snapshot is not an authoritative record; its loss after
//! expiry is accepted.
//!
//! The in-memory implementation keeps the same shape as a Redis `SET key
//! value EX ttl` / `GET key` pair so a distributed store can slot in behind
//! the trait without touching the coordinator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use paperdesk_core::AppError;

/// Key-value snapshot store with per-entry TTL.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry and resetting
    /// the TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError>;

    /// Fetch the value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory [`StatusStore`] with lazy expiry.
#[derive(Clone, Default)]
pub struct MemoryStatusStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Expiry is otherwise lazy (checked on read),
    /// so long-lived processes should call this periodically.
    pub async fn cleanup_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = MemoryStatusStore::new();
        store
            .set("batch_status:b1", "{\"processed\":1}", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.get("batch_status:b1").await.unwrap().as_deref(),
            Some("{\"processed\":1}")
        );
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryStatusStore::new();
        assert_eq!(store.get("batch_status:nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entry_is_not_returned() {
        let store = MemoryStatusStore::new();
        store
            .set("k", "v", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_replaces_value_and_resets_ttl() {
        let store = MemoryStatusStore::new();
        store
            .set("k", "old", Duration::from_millis(10))
            .await
            .unwrap();
        store.set("k", "new", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn cleanup_drops_expired_entries() {
        let store = MemoryStatusStore::new();
        store
            .set("gone", "v", Duration::from_millis(5))
            .await
            .unwrap();
        store.set("kept", "v", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.cleanup_expired().await;

        let entries = store.entries.read().await;
        assert!(!entries.contains_key("gone"));
        assert!(entries.contains_key("kept"));
    }
}
