//! Content hashing and metadata extraction.

use std::io::Cursor;

use image::{GenericImageView, ImageReader};
use pixvault_core::{AppError, ImageMetadata, UploadFile};
use sha2::{Digest, Sha256};

/// Derive metadata from an uploaded file's bytes.
///
/// Pure: no disk or network I/O. The MIME type comes from the detected image
/// format, never the filename extension, and the SHA-256 hash covers the same
/// raw bytes the dimensions were decoded from, so hash and metadata are
/// always consistent for one call.
pub fn extract_metadata(input: &UploadFile) -> Result<ImageMetadata, AppError> {
    extract_metadata_bytes(&input.data)
}

/// Byte-slice form of [`extract_metadata`], convenient for `spawn_blocking`.
pub fn extract_metadata_bytes(data: &[u8]) -> Result<ImageMetadata, AppError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("Could not probe image format: {}", e)))?;
    let format = reader
        .format()
        .ok_or_else(|| AppError::Decode("Unrecognized image format".to_string()))?;
    let img = reader
        .decode()
        .map_err(|e| AppError::Decode(format!("Could not decode image: {}", e)))?;

    let (width, height) = img.dimensions();

    let mut hasher = Sha256::new();
    hasher.update(data);
    let sha256_hash = hex::encode(hasher.finalize());

    Ok(ImageMetadata {
        width: Some(width as i32),
        height: Some(height as i32),
        mime_type: format.to_mime_type().to_string(),
        file_size_kb: (data.len() as f64 / 1024.0).round() as i32,
        sha256_hash: Some(sha256_hash),
        // Placeholder classification flag, intentionally constant.
        nsfw: true,
    })
}
