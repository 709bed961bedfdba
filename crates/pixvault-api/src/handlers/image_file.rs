//! Image file serving handler.
//!
//! Serves original files by path relative to the configured images
//! directory. Traversal is rejected lexically before any filesystem access,
//! then again after canonicalization (symlinks).

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    http::{header, StatusCode},
    response::Response,
};
use pixvault_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Immutable content under generated unique names never changes, so clients
/// may cache for a year.
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// MIME type from the file extension alone; serving never decodes the file.
fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Lexical traversal check: only plain path segments are allowed. Runs
/// before any filesystem access so a hostile path never reaches the disk.
fn validate_relative_path(raw: &str) -> Result<PathBuf, AppError> {
    let path = Path::new(raw);
    if raw.is_empty() {
        return Err(AppError::InvalidInput("Empty image path".to_string()));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            _ => {
                return Err(AppError::Forbidden(format!(
                    "Path traversal detected: {}",
                    raw
                )))
            }
        }
    }
    Ok(path.to_path_buf())
}

/// Serve an image file by relative path
#[utoipa::path(
    get,
    path = "/api/image/{path}",
    tag = "images",
    params(
        ("path" = String, Path, description = "Path relative to the images directory")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 403, description = "Path traversal rejected", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_image_file"))]
pub async fn get_image_file(
    State(state): State<Arc<AppState>>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response, HttpAppError> {
    let relative = validate_relative_path(&path)?;
    let candidate = state.config.base_images_path.join(&relative);

    if !state.fs.exists(&candidate).await {
        return Err(HttpAppError(AppError::NotFound(format!(
            "Image file not found: {}",
            path
        ))));
    }

    // Symlinks could still point outside the images directory; compare
    // canonical forms before reading.
    let resolved = state
        .fs
        .canonicalize(&candidate)
        .await
        .map_err(AppError::from)?;
    let base = state
        .fs
        .canonicalize(&state.config.base_images_path)
        .await
        .map_err(AppError::from)?;
    if !resolved.starts_with(&base) {
        return Err(HttpAppError(AppError::Forbidden(format!(
            "Path escapes images directory: {}",
            path
        ))));
    }

    let data = state.fs.read(&resolved).await.map_err(AppError::from)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_for_extension(&resolved))
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .body(data.into())
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
