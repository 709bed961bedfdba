//! Upload pipeline and seeding integration tests.
//!
//! Everything runs against the in-memory filesystem and repository, so the
//! suite never touches disk or a database.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use pixvault_core::{AppError, Image, NewImage, UploadFile};
use pixvault_db::{ImageRepository, InMemoryImageRepository};
use pixvault_processing::{SeedReport, Seeder, UploadPipeline};
use pixvault_storage::{FileSystem, MemoryFileSystem};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}

fn upload(filename: &str, data: Vec<u8>) -> UploadFile {
    UploadFile {
        data,
        filename: filename.to_string(),
    }
}

async fn fixture_fs() -> Arc<MemoryFileSystem> {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.create_dir_all(Path::new("/images")).await.unwrap();
    fs.create_dir_all(Path::new("/thumbs")).await.unwrap();
    fs
}

fn pipeline(fs: Arc<MemoryFileSystem>, repo: Arc<dyn ImageRepository>) -> UploadPipeline {
    UploadPipeline::new(
        fs,
        repo,
        PathBuf::from("/images"),
        Some(PathBuf::from("/thumbs")),
    )
}

async fn dir_file_count(fs: &MemoryFileSystem, dir: &Path) -> usize {
    fs.read_dir(dir)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| !e.is_dir)
        .count()
}

/// Repository whose `create` always fails, for rollback tests.
struct FailingRepository;

#[async_trait]
impl ImageRepository for FailingRepository {
    async fn create(&self, _image: &NewImage) -> Result<Image, AppError> {
        Err(AppError::Internal("injected create failure".to_string()))
    }

    async fn update_by_full_path(&self, _image: &NewImage) -> Result<Image, AppError> {
        Err(AppError::Internal("injected update failure".to_string()))
    }

    async fn find_many(&self, _limit: i64, _offset: i64) -> Result<Vec<Image>, AppError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: i32) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_successful_upload_writes_file_thumbnail_and_record() {
    let fs = fixture_fs().await;
    let repo = Arc::new(InMemoryImageRepository::new());
    let pipeline = pipeline(fs.clone(), repo.clone());

    let image = pipeline
        .process_upload(upload("holiday.png", png_bytes(600, 400)))
        .await
        .unwrap();

    assert!(fs.exists(Path::new(&image.full_path)).await);
    assert!(fs.exists(Path::new(&image.thumbnail_path)).await);
    assert_ne!(image.full_path, image.thumbnail_path);
    assert_eq!(image.original_file_name.as_deref(), Some("holiday.png"));
    assert_eq!(image.width, Some(600));
    assert_eq!(image.height, Some(400));
    assert_eq!(image.mime_type, "image/png");
    assert!(image.nsfw);
    assert!(image.source.is_none());
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_storage_name_is_unique_not_original() {
    let fs = fixture_fs().await;
    let repo = Arc::new(InMemoryImageRepository::new());
    let pipeline = pipeline(fs, repo);

    let image = pipeline
        .process_upload(upload("../../etc/passwd.png", png_bytes(10, 10)))
        .await
        .unwrap();

    // The stored name keeps only the extension; the hostile stem is gone.
    assert!(image.full_path.starts_with("/images/"));
    assert!(!image.full_path.contains(".."));
    assert!(image.full_path.ends_with(".png"));
}

#[tokio::test]
async fn test_rollback_on_insert_failure_removes_all_files() {
    let fs = fixture_fs().await;
    let pipeline = pipeline(fs.clone(), Arc::new(FailingRepository));

    let result = pipeline
        .process_upload(upload("doomed.png", png_bytes(400, 400)))
        .await;

    assert!(result.is_err());
    assert_eq!(dir_file_count(&fs, Path::new("/images")).await, 0);
    assert_eq!(dir_file_count(&fs, Path::new("/thumbs")).await, 0);
}

#[tokio::test]
async fn test_decode_failure_removes_written_original() {
    let fs = fixture_fs().await;
    let repo = Arc::new(InMemoryImageRepository::new());
    let pipeline = pipeline(fs.clone(), repo.clone());

    let result = pipeline
        .process_upload(upload("junk.png", b"definitely not a png".to_vec()))
        .await;

    assert!(matches!(result, Err(AppError::Decode(_))));
    assert_eq!(dir_file_count(&fs, Path::new("/images")).await, 0);
    assert!(repo.is_empty());
}

#[tokio::test]
async fn test_thumbnail_absence_falls_back_to_full_path() {
    let fs = fixture_fs().await;
    let repo = Arc::new(InMemoryImageRepository::new());
    // No thumbnails directory configured at all.
    let pipeline = UploadPipeline::new(fs, repo, PathBuf::from("/images"), None);

    let image = pipeline
        .process_upload(upload("plain.png", png_bytes(50, 50)))
        .await
        .unwrap();

    assert_eq!(image.thumbnail_path, image.full_path);
}

#[tokio::test]
async fn test_identical_content_same_hash_distinct_paths() {
    let fs = fixture_fs().await;
    let repo = Arc::new(InMemoryImageRepository::new());
    let pipeline = pipeline(fs, repo);

    let data = png_bytes(80, 80);
    let first = pipeline
        .process_upload(upload("one.png", data.clone()))
        .await
        .unwrap();
    let second = pipeline
        .process_upload(upload("two.png", data))
        .await
        .unwrap();

    assert_eq!(first.sha256_hash, second.sha256_hash);
    assert_ne!(first.full_path, second.full_path);
}

#[tokio::test]
async fn test_seeding_twice_reports_inserts_then_duplicates() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file(Path::new("/pics/a.png"), &png_bytes(20, 20)).await;
    fs.add_file(Path::new("/pics/b.png"), &png_bytes(30, 30)).await;
    fs.add_file(Path::new("/pics/nested/c.png"), &png_bytes(40, 40))
        .await;
    fs.create_dir_all(Path::new("/thumbs")).await.unwrap();

    let repo = Arc::new(InMemoryImageRepository::new());
    let seeder = Seeder::new(fs, repo.clone());

    let first = seeder
        .seed(Path::new("/pics"), Some(Path::new("/thumbs")))
        .await
        .unwrap();
    assert_eq!(
        first,
        SeedReport {
            inserted: 3,
            duplicates: 0,
            failures: 0
        }
    );

    let second = seeder
        .seed(Path::new("/pics"), Some(Path::new("/thumbs")))
        .await
        .unwrap();
    assert_eq!(
        second,
        SeedReport {
            inserted: 0,
            duplicates: 3,
            failures: 0
        }
    );
    assert_eq!(repo.len(), 3);
}

#[tokio::test]
async fn test_seeded_records_carry_source_and_thumbnail() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file(Path::new("/pics/a.png"), &png_bytes(500, 250)).await;
    fs.create_dir_all(Path::new("/thumbs")).await.unwrap();

    let repo = Arc::new(InMemoryImageRepository::new());
    let seeder = Seeder::new(fs, repo.clone());
    seeder
        .seed(Path::new("/pics"), Some(Path::new("/thumbs")))
        .await
        .unwrap();

    let records = repo.find_many(10, 0).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source.as_deref(), Some("local-seed"));
    assert_eq!(records[0].full_path, "/pics/a.png");
    assert_eq!(records[0].thumbnail_path, "/thumbs/a.png");
}

#[tokio::test]
async fn test_seeding_isolates_per_file_failures() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file(Path::new("/pics/good.png"), &png_bytes(20, 20)).await;
    fs.add_file(Path::new("/pics/bad.jpg"), b"corrupt bytes").await;

    let repo = Arc::new(InMemoryImageRepository::new());
    let seeder = Seeder::new(fs, repo.clone());

    let report = seeder.seed(Path::new("/pics"), None).await.unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.failures, 1);
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_seeding_missing_directory_fails() {
    let fs = Arc::new(MemoryFileSystem::new());
    let seeder = Seeder::new(fs, Arc::new(InMemoryImageRepository::new()));

    let result = seeder.seed(Path::new("/absent"), None).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
