//! Capacity-bounded file store over a [`StorageBackend`]

use crate::backend::StorageBackend;
use crate::error::{Result, StoreError};
use crate::memory_backend::MemoryBackend;
use crate::name::validate_name;
use crate::types::{EvictionPolicy, StoreConfig, StoreStats, StoredItem, UploadReceipt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A named file store that keeps its total size under a cap.
///
/// Uploads and deletes take the write side of `lock`, so the size check,
/// any eviction and the write itself happen as one step relative to other
/// writers. Queries take the read side and may run concurrently.
pub struct BoundedStore {
    backend: Arc<dyn StorageBackend>,
    config: StoreConfig,
    lock: RwLock<()>,
    evictions: AtomicU64,
}

impl BoundedStore {
    pub fn new(backend: Arc<dyn StorageBackend>, config: StoreConfig) -> Self {
        Self {
            backend,
            config,
            lock: RwLock::new(()),
            evictions: AtomicU64::new(0),
        }
    }

    /// A store backed by a fresh [`MemoryBackend`]
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), config)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Store `data` under `name`, evicting the oldest files first if the
    /// upload would push the total over capacity.
    ///
    /// Fails without touching the backend when the name is invalid, the
    /// content is larger than the whole store, or the name is taken.
    ///
    /// Eviction happens before the write and is not undone: if the backend
    /// then fails to write, the evicted files stay removed, `name` is not
    /// stored, and the call returns [`StoreError::Io`].
    pub async fn upload(&self, name: &str, data: &[u8]) -> Result<UploadReceipt> {
        let size = data.len() as u64;

        if let Err(e) = validate_name(name) {
            debug!(name = %name, error = %e, "Rejected upload");
            return Err(e);
        }

        if size > self.config.capacity_bytes {
            debug!(name = %name, size, capacity = self.config.capacity_bytes, "Rejected oversize upload");
            return Err(StoreError::TooLarge {
                size,
                capacity: self.config.capacity_bytes,
            });
        }

        let _guard = self.lock.write().await;

        if self.backend.contains(name).await? {
            debug!(name = %name, "Rejected duplicate upload");
            return Err(StoreError::AlreadyExists(name.to_string()));
        }

        let evicted = self.evict_if_needed(size).await?;

        // Something outside this store may still have claimed the name
        if !self.backend.put_if_absent(name, data).await? {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }

        info!(name = %name, size, evicted = evicted.len(), "Stored file");

        Ok(UploadReceipt {
            name: name.to_string(),
            size,
            evicted,
        })
    }

    /// Names of all stored audio files, sorted
    pub async fn list(&self) -> Result<Vec<String>> {
        let _guard = self.lock.read().await;

        let mut names: Vec<String> = self
            .audio_entries()
            .await?
            .into_iter()
            .map(|item| item.name)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Remove `name` if `credential` matches the configured secret
    pub async fn delete(&self, name: &str, credential: Option<&str>) -> Result<()> {
        if !self.is_authorized(credential) {
            warn!(name = %name, "Rejected delete with invalid credential");
            return Err(StoreError::Unauthorized);
        }

        // Names that could never have been stored do not reach the backend
        if validate_name(name).is_err() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let _guard = self.lock.write().await;

        if !self.backend.remove(name).await? {
            return Err(StoreError::NotFound(name.to_string()));
        }

        info!(name = %name, "Deleted file");
        Ok(())
    }

    pub async fn contains(&self, name: &str) -> Result<bool> {
        if validate_name(name).is_err() {
            return Ok(false);
        }
        let _guard = self.lock.read().await;
        self.backend.contains(name).await
    }

    /// Full content of `name`, if stored
    pub async fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if validate_name(name).is_err() {
            return Ok(None);
        }
        let _guard = self.lock.read().await;
        self.backend.read(name).await
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let _guard = self.lock.read().await;
        let entries = self.audio_entries().await?;

        Ok(StoreStats {
            items: entries.len(),
            total_bytes: entries.iter().map(|e| e.size).sum(),
            capacity_bytes: self.config.capacity_bytes,
            evictions: self.evictions.load(Ordering::Relaxed),
        })
    }

    fn is_authorized(&self, credential: Option<&str>) -> bool {
        match (self.config.delete_secret.as_deref(), credential) {
            (Some(secret), Some(given)) => secret == given,
            _ => false,
        }
    }

    /// Backend entries this store could have written. Anything else in the
    /// backend is neither listed, counted nor evicted, so every listed
    /// name can also be deleted.
    async fn audio_entries(&self) -> Result<Vec<StoredItem>> {
        let mut entries = self.backend.entries().await?;
        entries.retain(|e| validate_name(&e.name).is_ok());
        Ok(entries)
    }

    /// Evict oldest entries until there's room for `new_size` bytes, or only
    /// the single oldest under [`EvictionPolicy::SingleOldest`].
    /// Caller must hold the write lock.
    async fn evict_if_needed(&self, new_size: u64) -> Result<Vec<String>> {
        let capacity = self.config.capacity_bytes;
        let mut entries = self.audio_entries().await?;
        let mut total: u64 = entries.iter().map(|e| e.size).sum();

        if total.saturating_add(new_size) <= capacity {
            return Ok(Vec::new());
        }

        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut evicted = Vec::new();
        for entry in entries {
            if total.saturating_add(new_size) <= capacity {
                break;
            }
            if self.config.eviction_policy == EvictionPolicy::SingleOldest && !evicted.is_empty()
            {
                break;
            }

            if self.backend.remove(&entry.name).await? {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                info!(name = %entry.name, size = entry.size, "Evicted oldest file");
            }
            total = total.saturating_sub(entry.size);
            evicted.push(entry.name);
        }

        if total.saturating_add(new_size) > capacity {
            warn!(
                total_bytes = total,
                new_size,
                capacity,
                policy = %self.config.eviction_policy,
                "Store remains over capacity after eviction"
            );
        }

        Ok(evicted)
    }
}
