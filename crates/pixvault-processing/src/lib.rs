//! Upload ingestion pipeline and offline seeding.
//!
//! This crate owns the non-trivial part of the gallery: taking raw image
//! bytes, deriving metadata, writing originals and thumbnails, inserting the
//! database record, and compensating partial writes on failure.

pub mod metadata;
pub mod naming;
pub mod scanner;
pub mod seed;
pub mod thumbnail;
pub mod upload;

pub use metadata::extract_metadata;
pub use naming::unique_file_name;
pub use scanner::{DirectoryScanner, ScanOptions};
pub use seed::{SeedReport, Seeder};
pub use thumbnail::ThumbnailGenerator;
pub use upload::UploadPipeline;
