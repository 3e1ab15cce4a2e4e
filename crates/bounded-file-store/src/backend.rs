//! Persistence boundary for the store

use crate::error::Result;
use crate::types::StoredItem;
use async_trait::async_trait;

/// A byte store keyed by name.
///
/// Implementations hold no policy: name validation, capacity and
/// authorization all live in [`crate::BoundedStore`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write `data` under `name` unless the name is taken.
    /// Returns `false` without writing if it already exists.
    async fn put_if_absent(&self, name: &str, data: &[u8]) -> Result<bool>;

    /// All stored items with their size and creation time
    async fn entries(&self) -> Result<Vec<StoredItem>>;

    /// Remove `name`. Returns `false` if it did not exist.
    async fn remove(&self, name: &str) -> Result<bool>;

    async fn contains(&self, name: &str) -> Result<bool>;

    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;
}
