//! Original-file store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pixvault_core::UploadFile;

use crate::traits::{FileSystem, StorageError, StorageResult};

/// Writes original image bytes to a durable location.
///
/// The caller is expected to have already replaced `input.filename` with a
/// generated unique name; the store still refuses names carrying path
/// separators or traversal sequences as a second line of containment.
#[derive(Clone)]
pub struct FileStore {
    fs: Arc<dyn FileSystem>,
}

impl FileStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        FileStore { fs }
    }

    /// Write `input.data` to `target_dir/input.filename` and return the path.
    ///
    /// Creates exactly one file. The target directory must already exist;
    /// a missing directory is a write failure, not something to repair here.
    pub async fn store(&self, input: &UploadFile, target_dir: &Path) -> StorageResult<PathBuf> {
        validate_filename(&input.filename)?;

        if !self.fs.is_dir(target_dir).await {
            return Err(StorageError::WriteFailed(format!(
                "Target directory {} does not exist",
                target_dir.display()
            )));
        }

        let path = target_dir.join(&input.filename);
        self.fs.write(&path, &input.data).await?;

        tracing::info!(
            path = %path.display(),
            size_bytes = input.data.len(),
            "Stored original file"
        );

        Ok(path)
    }

    /// Remove a previously stored file. Used by pipeline compensation.
    pub async fn delete(&self, path: &Path) -> StorageResult<()> {
        self.fs.remove_file(path).await
    }
}

fn validate_filename(filename: &str) -> StorageResult<()> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(StorageError::InvalidPath(format!(
            "Refusing to store file named {:?}",
            filename
        )));
    }
    Ok(())
}
