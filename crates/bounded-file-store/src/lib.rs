//! Bounded file store for named audio blobs
//!
//! Stores MP3/WAV files under their upload names, rejects duplicates, and
//! keeps the total stored size under a configured cap by evicting the oldest
//! files before a write that would exceed it. The directory (or any other
//! [`StorageBackend`]) is the only index: sizes and creation times are
//! re-read from the backend on every operation.

mod backend;
mod error;
mod fs_backend;
mod memory_backend;
mod name;
mod store;
mod types;

pub use backend::StorageBackend;
pub use error::{Result, StoreError};
pub use fs_backend::FsBackend;
pub use memory_backend::MemoryBackend;
pub use name::{has_allowed_extension, validate_name, ALLOWED_EXTENSIONS, MAX_NAME_BYTES};
pub use store::BoundedStore;
pub use types::{
    EvictionPolicy, StoreConfig, StoreStats, StoredItem, UploadReceipt, DEFAULT_CAPACITY_BYTES,
};
