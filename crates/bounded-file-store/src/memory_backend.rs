//! In-memory storage, for tests and ephemeral stores

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::types::StoredItem;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

struct MemoryEntry {
    data: Vec<u8>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, MemoryEntry>,
    last_created: Option<DateTime<Utc>>,
}

/// Keeps items in a map. Creation timestamps are strictly increasing in
/// insertion order, so "oldest" is always well defined.
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn put_if_absent(&self, name: &str, data: &[u8]) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.entries.contains_key(name) {
            return Ok(false);
        }

        let now = Utc::now();
        let created_at = match inner.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        inner.last_created = Some(created_at);
        inner.entries.insert(
            name.to_string(),
            MemoryEntry {
                data: data.to_vec(),
                created_at,
            },
        );
        Ok(true)
    }

    async fn entries(&self) -> Result<Vec<StoredItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .iter()
            .map(|(name, entry)| StoredItem {
                name: name.clone(),
                size: entry.data.len() as u64,
                created_at: entry.created_at,
            })
            .collect())
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.entries.remove(name).is_some())
    }

    async fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.inner.read().await.entries.contains_key(name))
    }

    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(name).map(|e| e.data.clone()))
    }
}
