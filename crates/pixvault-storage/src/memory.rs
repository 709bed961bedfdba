//! In-memory filesystem adapter for tests.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::traits::{DirEntry, FileSystem, StorageError, StorageResult};

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
}

/// Filesystem adapter holding everything in memory.
///
/// Directories are tracked explicitly so that the "write does not create
/// parents" contract behaves exactly like the disk adapter.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    inner: Mutex<Inner>,
}

/// Lexically resolve `.` and `..` components; no symlinks exist in memory.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        MemoryFileSystem::default()
    }

    /// Convenience for test setup: create the directory and drop a file in it.
    pub async fn add_file(&self, path: &Path, data: &[u8]) {
        if let Some(parent) = path.parent() {
            // Infallible for the memory adapter.
            let _ = self.create_dir_all(parent).await;
        }
        self.inner
            .lock()
            .expect("memory fs lock")
            .files
            .insert(normalize(path), data.to_vec());
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        let path = normalize(path);
        let inner = self.inner.lock().expect("memory fs lock");
        inner.files.contains_key(&path) || inner.dirs.contains(&path)
    }

    async fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        let path = normalize(path);
        let inner = self.inner.lock().expect("memory fs lock");
        inner
            .files
            .get(&path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.display().to_string()))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let path = normalize(path);
        let mut inner = self.inner.lock().expect("memory fs lock");
        match path.parent() {
            Some(parent) if inner.dirs.contains(parent) => {
                inner.files.insert(path, data.to_vec());
                Ok(())
            }
            _ => Err(StorageError::WriteFailed(format!(
                "Failed to write file {}: parent directory does not exist",
                path.display()
            ))),
        }
    }

    async fn remove_file(&self, path: &Path) -> StorageResult<()> {
        let path = normalize(path);
        let mut inner = self.inner.lock().expect("memory fs lock");
        inner
            .files
            .remove(&path)
            .map(|_| ())
            .ok_or_else(|| StorageError::DeleteFailed(format!("No such file: {}", path.display())))
    }

    async fn read_dir(&self, path: &Path) -> StorageResult<Vec<DirEntry>> {
        let path = normalize(path);
        let inner = self.inner.lock().expect("memory fs lock");
        if !inner.dirs.contains(&path) {
            return Err(StorageError::NotFound(path.display().to_string()));
        }

        let mut entries = Vec::new();
        for file in inner.files.keys() {
            if file.parent() == Some(path.as_path()) {
                if let Some(name) = file.file_name() {
                    entries.push(DirEntry {
                        name: name.to_string_lossy().into_owned(),
                        is_dir: false,
                    });
                }
            }
        }
        for dir in inner.dirs.iter() {
            if dir.parent() == Some(path.as_path()) {
                if let Some(name) = dir.file_name() {
                    entries.push(DirEntry {
                        name: name.to_string_lossy().into_owned(),
                        is_dir: true,
                    });
                }
            }
        }
        Ok(entries)
    }

    async fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        let path = normalize(path);
        let mut inner = self.inner.lock().expect("memory fs lock");
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                inner.dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    async fn is_dir(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.inner
            .lock()
            .expect("memory fs lock")
            .dirs
            .contains(&path)
    }

    async fn canonicalize(&self, path: &Path) -> StorageResult<PathBuf> {
        let path = normalize(path);
        let inner = self.inner.lock().expect("memory fs lock");
        if inner.files.contains_key(&path) || inner.dirs.contains(&path) {
            Ok(path)
        } else {
            Err(StorageError::NotFound(path.display().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_requires_parent_dir() {
        let fs = MemoryFileSystem::new();
        let result = fs.write(Path::new("/images/a.png"), b"x").await;
        assert!(matches!(result, Err(StorageError::WriteFailed(_))));

        fs.create_dir_all(Path::new("/images")).await.unwrap();
        fs.write(Path::new("/images/a.png"), b"x").await.unwrap();
        assert_eq!(fs.read(Path::new("/images/a.png")).await.unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_read_dir_immediate_children_only() {
        let fs = MemoryFileSystem::new();
        fs.add_file(Path::new("/root/a.jpg"), b"a").await;
        fs.add_file(Path::new("/root/nested/c.png"), b"c").await;

        let entries = fs.read_dir(Path::new("/root")).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"a.jpg"));
        assert!(names.contains(&"nested"));
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_normalize_traversal() {
        let fs = MemoryFileSystem::new();
        fs.add_file(Path::new("/root/a.jpg"), b"a").await;
        // "/root/nested/../a.jpg" resolves to the same file.
        assert_eq!(
            fs.read(Path::new("/root/nested/../a.jpg")).await.unwrap(),
            b"a"
        );
    }

    #[tokio::test]
    async fn test_remove_missing_file_fails() {
        let fs = MemoryFileSystem::new();
        let result = fs.remove_file(Path::new("/nope.bin")).await;
        assert!(matches!(result, Err(StorageError::DeleteFailed(_))));
    }
}
