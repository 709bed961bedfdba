//! Real-disk filesystem adapter backed by tokio.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::traits::{DirEntry, FileSystem, StorageError, StorageResult};

/// Filesystem adapter over the host disk.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        LocalFileSystem
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        fs::read(path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    async fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        fs::write(path, data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })
    }

    async fn remove_file(&self, path: &Path) -> StorageResult<()> {
        fs::remove_file(path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })
    }

    async fn read_dir(&self, path: &Path) -> StorageResult<Vec<DirEntry>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        let mut entries = Vec::new();
        let mut reader = fs::read_dir(path).await.map_err(|e| {
            StorageError::ReadFailed(format!(
                "Failed to read directory {}: {}",
                path.display(),
                e
            ))
        })?;
        while let Some(entry) = reader.next_entry().await? {
            let file_type = entry.file_type().await?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
            });
        }
        Ok(entries)
    }

    async fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        fs::create_dir_all(path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn canonicalize(&self, path: &Path) -> StorageResult<PathBuf> {
        fs::canonicalize(path).await.map_err(|e| {
            StorageError::InvalidPath(format!(
                "Failed to canonicalize {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let path = dir.path().join("file.bin");

        fs.write(&path, b"hello").await.unwrap();
        assert!(fs.exists(&path).await);
        assert_eq!(fs.read(&path).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_write_missing_parent_fails() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let path = dir.path().join("missing").join("file.bin");

        let result = fs.write(&path, b"hello").await;
        assert!(matches!(result, Err(StorageError::WriteFailed(_))));
    }

    #[tokio::test]
    async fn test_read_dir_lists_entries() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        fs.write(&dir.path().join("a.jpg"), b"a").await.unwrap();
        fs.create_dir_all(&dir.path().join("nested")).await.unwrap();

        let mut entries = fs.read_dir(dir.path()).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.jpg");
        assert!(!entries[0].is_dir);
        assert_eq!(entries[1].name, "nested");
        assert!(entries[1].is_dir);
    }

    #[tokio::test]
    async fn test_read_dir_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let result = fs.read_dir(&dir.path().join("nope")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_file() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let path = dir.path().join("gone.bin");
        fs.write(&path, b"x").await.unwrap();
        fs.remove_file(&path).await.unwrap();
        assert!(!fs.exists(&path).await);
    }
}
