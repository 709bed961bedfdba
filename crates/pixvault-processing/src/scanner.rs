//! Local directory scanning for the offline seeding path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pixvault_core::AppError;
use pixvault_storage::FileSystem;

/// Extensions accepted by the scanner, matched case-insensitively.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jfif", "png", "gif", "webp"];

/// Whether a filename carries a supported image extension.
pub fn has_supported_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            SUPPORTED_IMAGE_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub recurse: bool,
    pub ignore_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            recurse: true,
            ignore_hidden: true,
        }
    }
}

/// Walks a directory tree and yields candidate image file paths.
#[derive(Clone)]
pub struct DirectoryScanner {
    fs: Arc<dyn FileSystem>,
}

impl DirectoryScanner {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        DirectoryScanner { fs }
    }

    /// List image files under `dir`. Hidden entries (leading `.`) are
    /// skipped when `ignore_hidden` is set — files and directories both, so
    /// a hidden subtree never contributes results. Returned order is
    /// unspecified.
    pub async fn scan(&self, dir: &Path, options: ScanOptions) -> Result<Vec<PathBuf>, AppError> {
        if !self.fs.is_dir(dir).await {
            return Err(AppError::NotFound(format!(
                "Directory {} does not exist",
                dir.display()
            )));
        }

        let mut results = Vec::new();
        // Depth-first with an explicit stack; subdirectories are only pushed
        // when recursion is requested.
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            for entry in self.fs.read_dir(&current).await? {
                if options.ignore_hidden && entry.name.starts_with('.') {
                    continue;
                }
                let path = current.join(&entry.name);
                if entry.is_dir {
                    if options.recurse {
                        pending.push(path);
                    }
                } else if has_supported_extension(&entry.name) {
                    results.push(path);
                }
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixvault_storage::MemoryFileSystem;

    async fn fixture_fs() -> Arc<MemoryFileSystem> {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file(Path::new("/pics/a.jpg"), b"a").await;
        fs.add_file(Path::new("/pics/b.png"), b"b").await;
        fs.add_file(Path::new("/pics/.hidden.jpg"), b"h").await;
        fs.add_file(Path::new("/pics/notes.txt"), b"t").await;
        fs.add_file(Path::new("/pics/nested/c.png"), b"c").await;
        fs
    }

    fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.sort();
        paths
    }

    #[tokio::test]
    async fn test_scan_non_recursive_skips_hidden_and_nested() {
        let scanner = DirectoryScanner::new(fixture_fs().await);
        let paths = scanner
            .scan(
                Path::new("/pics"),
                ScanOptions {
                    recurse: false,
                    ignore_hidden: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            sorted(paths),
            vec![PathBuf::from("/pics/a.jpg"), PathBuf::from("/pics/b.png")]
        );
    }

    #[tokio::test]
    async fn test_scan_recursive_includes_nested() {
        let scanner = DirectoryScanner::new(fixture_fs().await);
        let paths = scanner
            .scan(Path::new("/pics"), ScanOptions::default())
            .await
            .unwrap();

        assert_eq!(
            sorted(paths),
            vec![
                PathBuf::from("/pics/a.jpg"),
                PathBuf::from("/pics/b.png"),
                PathBuf::from("/pics/nested/c.png"),
            ]
        );
    }

    #[tokio::test]
    async fn test_hidden_file_never_appears() {
        let scanner = DirectoryScanner::new(fixture_fs().await);
        for recurse in [false, true] {
            let paths = scanner
                .scan(
                    Path::new("/pics"),
                    ScanOptions {
                        recurse,
                        ignore_hidden: true,
                    },
                )
                .await
                .unwrap();
            assert!(paths.iter().all(|p| !p.ends_with(".hidden.jpg")));
        }
    }

    #[tokio::test]
    async fn test_hidden_included_when_allowed() {
        let scanner = DirectoryScanner::new(fixture_fs().await);
        let paths = scanner
            .scan(
                Path::new("/pics"),
                ScanOptions {
                    recurse: false,
                    ignore_hidden: false,
                },
            )
            .await
            .unwrap();
        assert!(paths.contains(&PathBuf::from("/pics/.hidden.jpg")));
    }

    #[tokio::test]
    async fn test_missing_dir_is_not_found() {
        let scanner = DirectoryScanner::new(Arc::new(MemoryFileSystem::new()));
        let result = scanner
            .scan(Path::new("/absent"), ScanOptions::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_supported_extensions_case_insensitive() {
        assert!(has_supported_extension("photo.JPG"));
        assert!(has_supported_extension("anim.WebP"));
        assert!(has_supported_extension("scan.jfif"));
        assert!(!has_supported_extension("doc.pdf"));
        assert!(!has_supported_extension("noext"));
    }
}
