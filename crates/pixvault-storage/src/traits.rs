//! Filesystem capability trait and storage error taxonomy.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pixvault_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidPath(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// A single directory entry yielded by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Filesystem capability.
///
/// Everything that touches the filesystem goes through this trait so the
/// pipeline and scanner can run against [`crate::MemoryFileSystem`] in tests.
/// Note that `write` does NOT create parent directories: callers own the
/// decision of whether a missing target directory is fatal.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Whether a file or directory exists at `path`.
    async fn exists(&self, path: &Path) -> bool;

    /// Read the full contents of a file.
    async fn read(&self, path: &Path) -> StorageResult<Vec<u8>>;

    /// Write `data` to `path`, replacing any existing file. Fails when the
    /// parent directory does not exist.
    async fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()>;

    /// Remove a single file.
    async fn remove_file(&self, path: &Path) -> StorageResult<()>;

    /// List the entries of a directory (non-recursive).
    async fn read_dir(&self, path: &Path) -> StorageResult<Vec<DirEntry>>;

    /// Create a directory and all missing ancestors.
    async fn create_dir_all(&self, path: &Path) -> StorageResult<()>;

    /// Whether `path` refers to a directory.
    async fn is_dir(&self, path: &Path) -> bool;

    /// Canonical form of `path`, used for traversal containment checks.
    /// Adapters without a real disk may return the path unchanged.
    async fn canonicalize(&self, path: &Path) -> StorageResult<PathBuf>;
}
