use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tag::Tag;

/// A raw uploaded (or locally read) file entering the pipeline.
///
/// Transient: consumed by the upload pipeline and discarded. `filename` is
/// whatever name the file currently carries; the pipeline replaces it with a
/// generated unique name before any durable write.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub data: Vec<u8>,
    pub filename: String,
}

/// Metadata derived once per input buffer by the metadata extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub mime_type: String,
    pub file_size_kb: i32,
    pub sha256_hash: Option<String>,
    /// Placeholder classification flag; always `true` until a real
    /// classifier is wired in. Preserved as-is, not computed.
    pub nsfw: bool,
}

/// A persisted image record with its joined tags.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: i32,
    /// Location of the original file. Globally unique; the natural key used
    /// for upsert/duplicate detection.
    pub full_path: String,
    /// Location of the thumbnail, or equal to `full_path` when thumbnail
    /// generation was skipped or failed.
    pub thumbnail_path: String,
    /// Filename supplied by the uploading client, kept for display/audit.
    pub original_file_name: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub mime_type: String,
    pub file_size_kb: i32,
    pub sha256_hash: Option<String>,
    pub nsfw: bool,
    /// Provenance: "local-seed" for offline-ingested images, None for live uploads.
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    // Reserved fields, not populated by the current pipeline.
    pub group_id: Option<i32>,
    pub large_path: Option<String>,
    pub perceptual_hash: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Fields for creating (or upserting) an image record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    pub full_path: String,
    pub thumbnail_path: String,
    pub original_file_name: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub mime_type: String,
    pub file_size_kb: i32,
    pub sha256_hash: Option<String>,
    pub nsfw: bool,
    pub source: Option<String>,
}

impl NewImage {
    /// Build a record from extracted metadata plus the pipeline's path
    /// decisions. `thumbnail_path = None` applies the fallback policy:
    /// a record is never left with an undefined thumbnail path.
    pub fn from_metadata(
        metadata: ImageMetadata,
        full_path: String,
        thumbnail_path: Option<String>,
        original_file_name: Option<String>,
        source: Option<String>,
    ) -> Self {
        let thumbnail_path = thumbnail_path.unwrap_or_else(|| full_path.clone());
        NewImage {
            full_path,
            thumbnail_path,
            original_file_name,
            width: metadata.width,
            height: metadata.height,
            mime_type: metadata.mime_type,
            file_size_kb: metadata.file_size_kb,
            sha256_hash: metadata.sha256_hash,
            nsfw: metadata.nsfw,
            source,
        }
    }
}
