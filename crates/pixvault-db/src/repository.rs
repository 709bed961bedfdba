//! Repository trait for image records.

use async_trait::async_trait;
use pixvault_core::{AppError, Image, NewImage};

/// Persistence operations for image records.
///
/// Each call is one logical unit of work: implementations acquire whatever
/// connection they need for the duration of the call and release it on every
/// exit path. `full_path` is the unique natural key; `create` on a duplicate
/// yields [`AppError::UniqueViolation`], which the database's own constraint
/// enforcement makes the sole cross-request concurrency guard.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Insert a new record; fails with `UniqueViolation` when `full_path`
    /// already exists.
    async fn create(&self, image: &NewImage) -> Result<Image, AppError>;

    /// Overwrite every mutable field of the record with this `full_path`,
    /// preserving `id` and `created_at`. Fails with `NotFound` when absent.
    async fn update_by_full_path(&self, image: &NewImage) -> Result<Image, AppError>;

    /// Most recently inserted first (descending id), tags joined in.
    async fn find_many(&self, limit: i64, offset: i64) -> Result<Vec<Image>, AppError>;

    /// Delete one record by id. Deleting an absent id is not an error.
    async fn delete(&self, id: i32) -> Result<(), AppError>;

    /// Administrative reset: clear all image and tag data.
    async fn delete_all(&self) -> Result<(), AppError>;

    /// Create-if-absent, else full field overwrite.
    async fn upsert(&self, image: &NewImage) -> Result<Image, AppError> {
        match self.create(image).await {
            Err(AppError::UniqueViolation(_)) => self.update_by_full_path(image).await,
            other => other,
        }
    }
}
