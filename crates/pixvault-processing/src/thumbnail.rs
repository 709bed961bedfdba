//! Thumbnail generation.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixvault_core::{AppError, UploadFile};
use pixvault_storage::FileSystem;

/// Thumbnails fit inside this bounding box, aspect ratio preserved.
const MAX_WIDTH: u32 = 300;
const MAX_HEIGHT: u32 = 300;

/// Produces fixed-bounds thumbnails next to the original filename.
///
/// Absence of a thumbnail must never abort an upload: a missing or
/// unconfigured target directory and a decode failure both degrade to
/// `Ok(None)` (the caller falls back to the original path). Only an actual
/// write failure is an error.
#[derive(Clone)]
pub struct ThumbnailGenerator {
    fs: Arc<dyn FileSystem>,
    max_width: u32,
    max_height: u32,
}

impl ThumbnailGenerator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        ThumbnailGenerator {
            fs,
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
        }
    }

    /// Decode `input`, resize to fit inside the bounding box, and write the
    /// result to `target_dir/input.filename`.
    pub async fn generate(
        &self,
        input: &UploadFile,
        target_dir: Option<&Path>,
    ) -> Result<Option<PathBuf>, AppError> {
        let Some(dir) = target_dir else {
            tracing::warn!(
                filename = %input.filename,
                "Thumbnail directory is not configured; skipping thumbnail"
            );
            return Ok(None);
        };

        if !self.fs.is_dir(dir).await {
            tracing::warn!(
                dir = %dir.display(),
                filename = %input.filename,
                "Thumbnail directory does not exist; skipping thumbnail"
            );
            return Ok(None);
        }

        let data = input.data.clone();
        let (max_width, max_height) = (self.max_width, self.max_height);
        // Decode and resize are CPU-bound; run off the async pool.
        let rendered =
            tokio::task::spawn_blocking(move || render_thumbnail(&data, max_width, max_height))
                .await
                .map_err(|e| AppError::Internal(format!("Thumbnail task panicked: {}", e)))?;

        let encoded = match rendered {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(
                    filename = %input.filename,
                    error = %err,
                    "Could not generate thumbnail"
                );
                return Ok(None);
            }
        };

        let path = dir.join(&input.filename);
        self.fs.write(&path, &encoded).await?;

        tracing::debug!(path = %path.display(), "Thumbnail written");
        Ok(Some(path))
    }
}

/// Decode, fit-inside resize, and re-encode in the source format.
fn render_thumbnail(data: &[u8], max_width: u32, max_height: u32) -> Result<Vec<u8>, AppError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("Could not probe image format: {}", e)))?;
    let format = reader
        .format()
        .ok_or_else(|| AppError::Decode("Unrecognized image format".to_string()))?;
    let img = reader
        .decode()
        .map_err(|e| AppError::Decode(format!("Could not decode image: {}", e)))?;

    // `thumbnail` scales down proportionally so neither dimension exceeds
    // the bound; images already inside the box are left at their own size.
    let thumb = img.thumbnail(max_width, max_height);

    let mut out = Vec::new();
    thumb
        .write_to(&mut Cursor::new(&mut out), format)
        .map_err(|e| AppError::Internal(format!("Could not encode thumbnail: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};
    use pixvault_storage::MemoryFileSystem;

    fn png_input(width: u32, height: u32, filename: &str) -> UploadFile {
        let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
        let mut data = Vec::new();
        img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        UploadFile {
            data,
            filename: filename.to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_fits_inside_bounds() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.create_dir_all(Path::new("/thumbs")).await.unwrap();
        let generator = ThumbnailGenerator::new(fs.clone());

        let input = png_input(600, 300, "wide.png");
        let path = generator
            .generate(&input, Some(Path::new("/thumbs")))
            .await
            .unwrap()
            .expect("thumbnail path");

        assert_eq!(path, PathBuf::from("/thumbs/wide.png"));
        let written = fs.read(&path).await.unwrap();
        let thumb = image::load_from_memory(&written).unwrap();
        let (w, h) = thumb.dimensions();
        assert!(w <= 300 && h <= 300);
        // 2:1 aspect ratio preserved.
        assert_eq!(w, 300);
        assert_eq!(h, 150);
    }

    #[tokio::test]
    async fn test_unconfigured_dir_yields_none() {
        let fs = Arc::new(MemoryFileSystem::new());
        let generator = ThumbnailGenerator::new(fs);
        let input = png_input(50, 50, "a.png");

        let result = generator.generate(&input, None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_missing_dir_yields_none() {
        let fs = Arc::new(MemoryFileSystem::new());
        let generator = ThumbnailGenerator::new(fs);
        let input = png_input(50, 50, "a.png");

        let result = generator
            .generate(&input, Some(Path::new("/nope")))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_bytes_yield_none() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.create_dir_all(Path::new("/thumbs")).await.unwrap();
        let generator = ThumbnailGenerator::new(fs);

        let input = UploadFile {
            data: b"garbage".to_vec(),
            filename: "garbage.png".to_string(),
        };
        let result = generator
            .generate(&input, Some(Path::new("/thumbs")))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
