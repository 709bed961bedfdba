pub mod gallery;
pub mod health;
pub mod image_file;
pub mod upload;
