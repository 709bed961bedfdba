//! Multipart image upload handler.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pixvault_core::{AppError, Image, UploadFile};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// What the client sent, echoed back per accepted part.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedFileSummary {
    pub name: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub files: Vec<UploadedFileSummary>,
    pub images: Vec<Image>,
}

/// Reject a part before any byte of it is written anywhere. The declared
/// content type must be `image/<subtype>` with an allow-listed subtype.
fn validate_content_type(content_type: Option<&str>, allowed: &[String]) -> Result<String, AppError> {
    let Some(content_type) = content_type else {
        return Err(AppError::InvalidInput(
            "Missing content type for uploaded file".to_string(),
        ));
    };
    let Some(subtype) = content_type.strip_prefix("image/") else {
        return Err(AppError::InvalidInput(format!(
            "Not an image upload: {}",
            content_type
        )));
    };
    if !allowed.iter().any(|a| a.eq_ignore_ascii_case(subtype)) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Unsupported image type: {}",
            content_type
        )));
    }
    Ok(content_type.to_string())
}

/// Upload one or more images
///
/// Each `files` part runs through the full ingestion pipeline (write
/// original, extract metadata, generate thumbnail, insert record), strictly
/// in order. The batch is fail-fast: the first failing part aborts the
/// request, its own partial writes rolled back, while earlier parts remain
/// committed.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Images uploaded", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported image type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_images"))]
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut files = Vec::new();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(HttpAppError::from)? {
        if field.name() != Some("files") {
            tracing::debug!(field = ?field.name(), "Skipping non-file multipart field");
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("Uploaded part has no filename".to_string()))?;
        let content_type = validate_content_type(
            field.content_type(),
            &state.config.allowed_image_types,
        )?;

        let data = field.bytes().await.map_err(HttpAppError::from)?.to_vec();
        if data.len() > state.config.max_file_size_bytes {
            return Err(HttpAppError(AppError::PayloadTooLarge(format!(
                "{} exceeds the {} byte limit",
                filename, state.config.max_file_size_bytes
            ))));
        }

        let size = data.len();
        let image = state
            .pipeline
            .process_upload(UploadFile { data, filename: filename.clone() })
            .await?;

        files.push(UploadedFileSummary {
            name: filename,
            size,
            content_type,
            success: true,
        });
        images.push(image);
    }

    if files.is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "No files uploaded".to_string(),
        )));
    }

    tracing::info!(count = files.len(), "Upload batch complete");
    Ok((StatusCode::CREATED, Json(UploadResponse { files, images })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["jpeg".into(), "png".into(), "gif".into(), "webp".into()]
    }

    #[test]
    fn test_validate_accepts_allowed_subtype() {
        let ct = validate_content_type(Some("image/png"), &allowed()).unwrap();
        assert_eq!(ct, "image/png");
    }

    #[test]
    fn test_validate_rejects_non_image() {
        let err = validate_content_type(Some("application/pdf"), &allowed()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_unknown_subtype() {
        let err = validate_content_type(Some("image/tiff"), &allowed()).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_validate_rejects_missing_content_type() {
        let err = validate_content_type(None, &allowed()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
