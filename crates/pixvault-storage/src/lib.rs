//! Filesystem abstraction and original-file storage.
//!
//! The [`FileSystem`] trait is the injectable capability every disk-touching
//! component (file store, thumbnail generator, directory scanner, seeder) is
//! built on. Two adapters ship here: [`LocalFileSystem`] backed by tokio's
//! filesystem and [`MemoryFileSystem`] for tests that must not touch disk.

mod local;
mod memory;
mod store;
mod traits;

pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;
pub use store::FileStore;
pub use traits::{DirEntry, FileSystem, StorageError, StorageResult};
