//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use pixvault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pixvault API",
        version = "0.1.0",
        description = "Image gallery API: multipart uploads with thumbnail generation and compensating rollback, paginated listing, and direct file serving."
    ),
    paths(
        handlers::upload::upload_images,
        handlers::gallery::list_images,
        handlers::image_file::get_image_file,
    ),
    components(schemas(
        models::Image,
        models::ImageMetadata,
        models::Tag,
        handlers::upload::UploadResponse,
        handlers::upload::UploadedFileSummary,
        error::ErrorResponse,
    )),
    tags(
        (name = "images", description = "Image upload, listing, and serving")
    )
)]
pub struct ApiDoc;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
