//! Upload orchestrator.
//!
//! One transaction-like unit of work per uploaded file: rename, write the
//! original, extract metadata, generate a thumbnail, insert the record.
//! Any failure after a durable write triggers best-effort compensation;
//! cleanup failures are logged and swallowed so the originating error is
//! always what the caller observes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pixvault_core::{AppError, Image, NewImage, UploadFile};
use pixvault_db::ImageRepository;
use pixvault_storage::{FileStore, FileSystem};

use crate::metadata::extract_metadata_bytes;
use crate::naming::unique_file_name;
use crate::thumbnail::ThumbnailGenerator;

/// Tracks durable writes made so far in one pipeline run so they can be
/// compensated in reverse order. The record (if any) goes first, then the
/// thumbnail, then the original file.
#[derive(Default)]
struct Compensation {
    record_id: Option<i32>,
    thumbnail: Option<PathBuf>,
    original: Option<PathBuf>,
}

/// Sequences one uploaded file through the full ingestion pipeline.
#[derive(Clone)]
pub struct UploadPipeline {
    store: FileStore,
    thumbnailer: ThumbnailGenerator,
    repo: Arc<dyn ImageRepository>,
    images_dir: PathBuf,
    thumbnails_dir: Option<PathBuf>,
}

impl UploadPipeline {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        repo: Arc<dyn ImageRepository>,
        images_dir: PathBuf,
        thumbnails_dir: Option<PathBuf>,
    ) -> Self {
        UploadPipeline {
            store: FileStore::new(fs.clone()),
            thumbnailer: ThumbnailGenerator::new(fs),
            repo,
            images_dir,
            thumbnails_dir,
        }
    }

    /// Process one uploaded file, strictly sequentially: no step begins
    /// before the previous completes.
    pub async fn process_upload(&self, file: UploadFile) -> Result<Image, AppError> {
        let original_file_name = file.filename.clone();
        let input = UploadFile {
            filename: unique_file_name(&original_file_name),
            data: file.data,
        };

        let mut compensation = Compensation::default();

        match self.run(&input, &original_file_name, &mut compensation).await {
            Ok(image) => Ok(image),
            Err(err) => {
                tracing::error!(
                    original_file_name = %original_file_name,
                    error = %err,
                    "Upload pipeline failed; rolling back"
                );
                self.rollback(compensation).await;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        input: &UploadFile,
        original_file_name: &str,
        compensation: &mut Compensation,
    ) -> Result<Image, AppError> {
        // 1. Write the original. On failure nothing durable exists yet and
        //    there is nothing to compensate.
        let full_path = self.store.store(input, &self.images_dir).await?;
        compensation.original = Some(full_path.clone());

        // 2. Metadata. Decode is CPU-bound; run off the async pool.
        let data = input.data.clone();
        let metadata = tokio::task::spawn_blocking(move || extract_metadata_bytes(&data))
            .await
            .map_err(|e| AppError::Internal(format!("Metadata task panicked: {}", e)))??;

        // 3. Thumbnail. `None` is not a failure: the record falls back to
        //    the original path.
        let thumbnail_path = self
            .thumbnailer
            .generate(input, self.thumbnails_dir.as_deref())
            .await?;
        compensation.thumbnail = thumbnail_path.clone();

        // 4. Insert the record.
        let record = NewImage::from_metadata(
            metadata,
            full_path.display().to_string(),
            thumbnail_path.map(|p| p.display().to_string()),
            Some(original_file_name.to_string()),
            None,
        );
        let image = self.repo.create(&record).await?;
        compensation.record_id = Some(image.id);

        Ok(image)
    }

    /// Best-effort compensation. Failures here are logged at warn and never
    /// replace the primary error.
    async fn rollback(&self, compensation: Compensation) {
        if let Some(id) = compensation.record_id {
            if let Err(err) = self.repo.delete(id).await {
                tracing::warn!(id, error = %err, "Rollback: could not delete image record");
            }
        }
        if let Some(path) = compensation.thumbnail {
            self.delete_file(&path, "thumbnail").await;
        }
        if let Some(path) = compensation.original {
            self.delete_file(&path, "original").await;
        }
    }

    async fn delete_file(&self, path: &Path, what: &str) {
        if let Err(err) = self.store.delete(path).await {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Rollback: could not delete {what} file"
            );
        }
    }
}
