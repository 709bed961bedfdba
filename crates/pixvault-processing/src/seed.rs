//! Offline seeding: create-or-update records for images already on disk.
//!
//! Contrasts deliberately with the live upload path: seeding favors maximal
//! completion (per-item error isolation), while a live multi-file upload is
//! fail-fast for the batch.

use std::path::Path;
use std::sync::Arc;

use pixvault_core::{AppError, NewImage, UploadFile};
use pixvault_db::ImageRepository;
use pixvault_storage::FileSystem;
use serde::Serialize;

use crate::metadata::extract_metadata_bytes;
use crate::scanner::{DirectoryScanner, ScanOptions};
use crate::thumbnail::ThumbnailGenerator;

/// Provenance tag written onto every seeded record.
const SEED_SOURCE: &str = "local-seed";

/// Final counts of one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub failures: usize,
}

enum SeedOutcome {
    Inserted,
    Overwritten,
}

/// Batches scanner + metadata + thumbnail output into upserts.
#[derive(Clone)]
pub struct Seeder {
    fs: Arc<dyn FileSystem>,
    repo: Arc<dyn ImageRepository>,
    scanner: DirectoryScanner,
    thumbnailer: ThumbnailGenerator,
}

impl Seeder {
    pub fn new(fs: Arc<dyn FileSystem>, repo: Arc<dyn ImageRepository>) -> Self {
        Seeder {
            scanner: DirectoryScanner::new(fs.clone()),
            thumbnailer: ThumbnailGenerator::new(fs.clone()),
            fs,
            repo,
        }
    }

    /// Seed every supported image under `images_dir`. A per-file error is
    /// counted and logged, never propagated: all remaining files are still
    /// processed. Only a missing root directory aborts the run.
    pub async fn seed(
        &self,
        images_dir: &Path,
        thumbnails_dir: Option<&Path>,
    ) -> Result<SeedReport, AppError> {
        let files = self.scanner.scan(images_dir, ScanOptions::default()).await?;

        if files.is_empty() {
            tracing::warn!(
                dir = %images_dir.display(),
                "No images found - add some samples!"
            );
            return Ok(SeedReport::default());
        }

        tracing::info!(count = files.len(), "Prepared images for seeding");

        let mut report = SeedReport::default();
        for path in &files {
            match self.seed_one(path, thumbnails_dir).await {
                Ok(SeedOutcome::Inserted) => report.inserted += 1,
                Ok(SeedOutcome::Overwritten) => report.duplicates += 1,
                Err(err) => {
                    report.failures += 1;
                    tracing::error!(path = %path.display(), error = %err, "Failed to seed image");
                }
            }
        }

        tracing::info!(
            inserted = report.inserted,
            duplicates = report.duplicates,
            failures = report.failures,
            "Upsert complete"
        );
        Ok(report)
    }

    async fn seed_one(
        &self,
        path: &Path,
        thumbnails_dir: Option<&Path>,
    ) -> Result<SeedOutcome, AppError> {
        let data = self.fs.read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::InvalidInput(format!("Not a file path: {}", path.display())))?;
        let input = UploadFile { data, filename };

        let bytes = input.data.clone();
        let metadata = tokio::task::spawn_blocking(move || extract_metadata_bytes(&bytes))
            .await
            .map_err(|e| AppError::Internal(format!("Metadata task panicked: {}", e)))??;

        let thumbnail_path = self.thumbnailer.generate(&input, thumbnails_dir).await?;

        let record = NewImage::from_metadata(
            metadata,
            path.display().to_string(),
            thumbnail_path.map(|p| p.display().to_string()),
            None,
            Some(SEED_SOURCE.to_string()),
        );

        match self.repo.create(&record).await {
            Ok(_) => Ok(SeedOutcome::Inserted),
            Err(AppError::UniqueViolation(_)) => {
                self.repo.update_by_full_path(&record).await?;
                Ok(SeedOutcome::Overwritten)
            }
            Err(err) => Err(err),
        }
    }
}
