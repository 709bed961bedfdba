//! Postgres-backed image repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pixvault_core::{AppError, Image, NewImage, Tag};
use sqlx::PgPool;

use crate::repository::ImageRepository;

const IMAGE_COLUMNS: &str = "id, full_path, thumbnail_path, original_file_name, width, height, \
     mime_type, file_size_kb, sha256_hash, nsfw, source, group_id, large_path, \
     perceptual_hash, created_at";

/// Row shape for the `images` table.
#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: i32,
    full_path: String,
    thumbnail_path: String,
    original_file_name: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    mime_type: String,
    file_size_kb: i32,
    sha256_hash: Option<String>,
    nsfw: bool,
    source: Option<String>,
    group_id: Option<i32>,
    large_path: Option<String>,
    perceptual_hash: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct TagJoinRow {
    image_id: i32,
    id: i32,
    name: String,
}

impl ImageRow {
    fn into_image(self, tags: Vec<Tag>) -> Image {
        Image {
            id: self.id,
            full_path: self.full_path,
            thumbnail_path: self.thumbnail_path,
            original_file_name: self.original_file_name,
            width: self.width,
            height: self.height,
            mime_type: self.mime_type,
            file_size_kb: self.file_size_kb,
            sha256_hash: self.sha256_hash,
            nsfw: self.nsfw,
            source: self.source,
            created_at: self.created_at,
            group_id: self.group_id,
            large_path: self.large_path,
            perceptual_hash: self.perceptual_hash,
            tags,
        }
    }
}

/// Image repository over a sqlx connection pool.
///
/// The pool hands each call its own connection and returns it when the call
/// finishes, on success and on error alike.
#[derive(Clone)]
pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn tags_for(&self, image_ids: &[i32]) -> Result<HashMap<i32, Vec<Tag>>, AppError> {
        if image_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<TagJoinRow> = sqlx::query_as(
            "SELECT it.image_id, t.id, t.name
             FROM image_tags it
             JOIN tags t ON t.id = it.tag_id
             WHERE it.image_id = ANY($1)
             ORDER BY t.name",
        )
        .bind(image_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<i32, Vec<Tag>> = HashMap::new();
        for row in rows {
            map.entry(row.image_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
            });
        }
        Ok(map)
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn create(&self, image: &NewImage) -> Result<Image, AppError> {
        let row: ImageRow = sqlx::query_as(&format!(
            "INSERT INTO images (full_path, thumbnail_path, original_file_name, width, height, \
             mime_type, file_size_kb, sha256_hash, nsfw, source)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(&image.full_path)
        .bind(&image.thumbnail_path)
        .bind(&image.original_file_name)
        .bind(image.width)
        .bind(image.height)
        .bind(&image.mime_type)
        .bind(image.file_size_kb)
        .bind(&image.sha256_hash)
        .bind(image.nsfw)
        .bind(&image.source)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, full_path = %row.full_path, "Inserted image record");
        Ok(row.into_image(Vec::new()))
    }

    async fn update_by_full_path(&self, image: &NewImage) -> Result<Image, AppError> {
        let row: Option<ImageRow> = sqlx::query_as(&format!(
            "UPDATE images
             SET thumbnail_path = $2, original_file_name = $3, width = $4, height = $5,
                 mime_type = $6, file_size_kb = $7, sha256_hash = $8, nsfw = $9, source = $10
             WHERE full_path = $1
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(&image.full_path)
        .bind(&image.thumbnail_path)
        .bind(&image.original_file_name)
        .bind(image.width)
        .bind(image.height)
        .bind(&image.mime_type)
        .bind(image.file_size_kb)
        .bind(&image.sha256_hash)
        .bind(image.nsfw)
        .bind(&image.source)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| {
            AppError::NotFound(format!("No image record for {}", image.full_path))
        })?;
        let tags = self.tags_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
        Ok(row.into_image(tags))
    }

    async fn find_many(&self, limit: i64, offset: i64) -> Result<Vec<Image>, AppError> {
        let rows: Vec<ImageRow> = sqlx::query_as(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images ORDER BY id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut tag_map = self.tags_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tag_map.remove(&row.id).unwrap_or_default();
                row.into_image(tags)
            })
            .collect())
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM image_tags").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM images").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM tags").execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!("Cleared all image and tag data");
        Ok(())
    }
}
