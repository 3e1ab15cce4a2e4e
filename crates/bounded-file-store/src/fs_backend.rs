//! Directory-backed storage

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::types::StoredItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

/// Stores each item as a file named after it inside one directory.
///
/// Writes go to a hidden `.partial` file first and are then hard-linked to
/// the final name, so a name never points at half-written content and an
/// existing name is never overwritten. Hidden files are not items.
pub struct FsBackend {
    dir: PathBuf,
    next_temp: AtomicU64,
}

impl FsBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_temp: AtomicU64::new(0),
        }
    }

    /// Ensure the directory exists and clear partial files left by a crash
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let mut removed = 0usize;
        let mut dir = fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') && name.ends_with(".partial") {
                fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        info!(dir = ?self.dir, removed_partials = removed, "Storage directory ready");
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Independent of the item name, so any name that fits the
    /// filesystem also fits its temp file
    fn temp_path(&self) -> PathBuf {
        let n = self.next_temp.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(".{}-{}.partial", std::process::id(), n))
    }

    async fn discard_temp(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = ?path, error = %e, "Failed to remove partial file");
            }
        }
    }
}

#[async_trait]
impl StorageBackend for FsBackend {
    async fn put_if_absent(&self, name: &str, data: &[u8]) -> Result<bool> {
        let final_path = self.dir.join(name);
        let temp_path = self.temp_path();

        if let Err(e) = fs::write(&temp_path, data).await {
            self.discard_temp(&temp_path).await;
            return Err(e.into());
        }

        let linked = fs::hard_link(&temp_path, &final_path).await;
        self.discard_temp(&temp_path).await;

        match linked {
            Ok(()) => {
                debug!(path = ?final_path, size = data.len(), "Wrote file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn entries(&self) -> Result<Vec<StoredItem>> {
        let mut items = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) => m,
                // Removed between listing and stat
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if !metadata.is_file() {
                continue;
            }

            // Birth time is not available on every filesystem
            let created = metadata.created().or_else(|_| metadata.modified())?;

            items.push(StoredItem {
                name,
                size: metadata.len(),
                created_at: DateTime::<Utc>::from(created),
            });
        }

        Ok(items)
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn contains(&self, name: &str) -> Result<bool> {
        match fs::metadata(self.dir.join(name)).await {
            Ok(m) => Ok(m.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.dir.join(name)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("uploads");
        let backend = FsBackend::new(&path);

        backend.init().await.unwrap();
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_init_removes_stale_partials() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".1-0.partial"), b"half").unwrap();
        std::fs::write(dir.path().join("keep.mp3"), b"whole").unwrap();

        let backend = FsBackend::new(dir.path());
        backend.init().await.unwrap();

        assert!(!dir.path().join(".1-0.partial").exists());
        assert!(dir.path().join("keep.mp3").exists());
    }

    #[tokio::test]
    async fn test_put_and_read() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        backend.init().await.unwrap();

        assert!(backend.put_if_absent("song.mp3", b"ID3data").await.unwrap());
        assert!(backend.contains("song.mp3").await.unwrap());
        assert_eq!(
            backend.read("song.mp3").await.unwrap(),
            Some(b"ID3data".to_vec())
        );
        assert_eq!(
            std::fs::read(dir.path().join("song.mp3")).unwrap(),
            b"ID3data"
        );
    }

    #[tokio::test]
    async fn test_put_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        backend.init().await.unwrap();

        assert!(backend.put_if_absent("song.mp3", b"first").await.unwrap());
        assert!(!backend.put_if_absent("song.mp3", b"second").await.unwrap());
        assert_eq!(
            backend.read("song.mp3").await.unwrap(),
            Some(b"first".to_vec())
        );
    }

    #[tokio::test]
    async fn test_put_leaves_no_partial_files() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        backend.init().await.unwrap();

        backend.put_if_absent("a.mp3", b"a").await.unwrap();
        backend.put_if_absent("a.mp3", b"again").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.mp3".to_string()]);
    }

    #[tokio::test]
    async fn test_put_long_name() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        backend.init().await.unwrap();

        let name = format!("{}.mp3", "a".repeat(251));
        assert_eq!(name.len(), 255);
        assert!(backend.put_if_absent(&name, b"long").await.unwrap());
        assert_eq!(backend.read(&name).await.unwrap(), Some(b"long".to_vec()));
    }

    #[tokio::test]
    async fn test_entries_report_size_and_skip_hidden_and_dirs() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        backend.init().await.unwrap();

        backend.put_if_absent("one.wav", b"0123456789").await.unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"junk").unwrap();
        std::fs::create_dir(dir.path().join("sub.mp3")).unwrap();

        let entries = backend.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "one.wav");
        assert_eq!(entries[0].size, 10);
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        backend.init().await.unwrap();

        backend.put_if_absent("gone.mp3", b"x").await.unwrap();
        assert!(backend.remove("gone.mp3").await.unwrap());
        assert!(!backend.remove("gone.mp3").await.unwrap());
        assert!(!backend.contains("gone.mp3").await.unwrap());
        assert_eq!(backend.read("gone.mp3").await.unwrap(), None);
    }
}
