//! Domain models shared across crates.

mod image;
mod tag;

pub use image::{Image, ImageMetadata, NewImage, UploadFile};
pub use tag::Tag;
