//! Gallery listing handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use pixvault_core::Image;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct PaginationQuery {
    /// Page size; defaults to the configured gallery page size.
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

/// List images, newest first
#[utoipa::path(
    get,
    path = "/api/images",
    tag = "images",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of images", body = Vec<Image>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_images"))]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Enforce the hard maximum to keep one request from dragging the whole
    // table over the wire.
    let limit = pagination
        .limit
        .unwrap_or(state.config.gallery_default_limit)
        .clamp(1, state.config.gallery_hard_limit);
    let offset = pagination.offset.max(0);

    let images = state.repo.find_many(limit, offset).await?;
    Ok(Json(images))
}
