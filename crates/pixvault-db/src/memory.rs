//! In-memory image repository for tests and diskless wiring.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use pixvault_core::{AppError, Image, NewImage};

use crate::repository::ImageRepository;

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    images: Vec<Image>,
}

/// Repository that keeps records in a `Vec` behind a mutex.
///
/// Mirrors the Postgres backend's observable behavior: unique `full_path`,
/// ids assigned in insertion order, `find_many` descending by id.
#[derive(Debug, Default)]
pub struct InMemoryImageRepository {
    inner: Mutex<Inner>,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("repository lock").images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn materialize(image: &NewImage, id: i32, created_at: chrono::DateTime<Utc>) -> Image {
    Image {
        id,
        full_path: image.full_path.clone(),
        thumbnail_path: image.thumbnail_path.clone(),
        original_file_name: image.original_file_name.clone(),
        width: image.width,
        height: image.height,
        mime_type: image.mime_type.clone(),
        file_size_kb: image.file_size_kb,
        sha256_hash: image.sha256_hash.clone(),
        nsfw: image.nsfw,
        source: image.source.clone(),
        created_at,
        group_id: None,
        large_path: None,
        perceptual_hash: None,
        tags: Vec::new(),
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn create(&self, image: &NewImage) -> Result<Image, AppError> {
        let mut inner = self.inner.lock().expect("repository lock");
        if inner.images.iter().any(|i| i.full_path == image.full_path) {
            return Err(AppError::UniqueViolation(format!(
                "duplicate full_path: {}",
                image.full_path
            )));
        }
        inner.next_id += 1;
        let record = materialize(image, inner.next_id, Utc::now());
        inner.images.push(record.clone());
        Ok(record)
    }

    async fn update_by_full_path(&self, image: &NewImage) -> Result<Image, AppError> {
        let mut inner = self.inner.lock().expect("repository lock");
        let existing = inner
            .images
            .iter_mut()
            .find(|i| i.full_path == image.full_path)
            .ok_or_else(|| {
                AppError::NotFound(format!("No image record for {}", image.full_path))
            })?;
        let updated = materialize(image, existing.id, existing.created_at);
        *existing = updated.clone();
        Ok(updated)
    }

    async fn find_many(&self, limit: i64, offset: i64) -> Result<Vec<Image>, AppError> {
        let inner = self.inner.lock().expect("repository lock");
        let mut images = inner.images.clone();
        images.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(images
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut inner = self.inner.lock().expect("repository lock");
        inner.images.retain(|i| i.id != id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), AppError> {
        let mut inner = self.inner.lock().expect("repository lock");
        inner.images.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_image(full_path: &str) -> NewImage {
        NewImage {
            full_path: full_path.to_string(),
            thumbnail_path: full_path.to_string(),
            original_file_name: None,
            width: Some(10),
            height: Some(10),
            mime_type: "image/png".to_string(),
            file_size_kb: 1,
            sha256_hash: Some("hash".to_string()),
            nsfw: true,
            source: None,
        }
    }

    #[tokio::test]
    async fn test_create_enforces_unique_full_path() {
        let repo = InMemoryImageRepository::new();
        repo.create(&new_image("/images/a.png")).await.unwrap();

        let err = repo.create(&new_image("/images/a.png")).await.unwrap_err();
        assert!(matches!(err, AppError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_upsert_preserves_id_and_created_at() {
        let repo = InMemoryImageRepository::new();
        let first = repo.create(&new_image("/images/a.png")).await.unwrap();

        let mut changed = new_image("/images/a.png");
        changed.width = Some(999);
        let second = repo.upsert(&changed).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.width, Some(999));
    }

    #[tokio::test]
    async fn test_find_many_descending_with_pagination() {
        let repo = InMemoryImageRepository::new();
        for i in 0..5 {
            repo.create(&new_image(&format!("/images/{i}.png")))
                .await
                .unwrap();
        }

        let page = repo.find_many(2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, 4);
        assert_eq!(page[1].id, 3);
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let repo = InMemoryImageRepository::new();
        let a = repo.create(&new_image("/images/a.png")).await.unwrap();
        repo.create(&new_image("/images/b.png")).await.unwrap();

        repo.delete(a.id).await.unwrap();
        assert_eq!(repo.len(), 1);

        repo.delete_all().await.unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let repo = InMemoryImageRepository::new();
        let err = repo
            .update_by_full_path(&new_image("/images/missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
