//! Collision-free storage filename generation.

use std::path::Path;

use uuid::Uuid;

/// Derive a unique storage filename from an uploaded file's original name.
///
/// The stem is discarded entirely; only the extension survives, verbatim
/// (case included). The random UUIDv4 token makes collisions practically
/// impossible and the result never contains separators or traversal
/// sequences, whatever the input looked like.
pub fn unique_file_name(original_file_name: &str) -> String {
    let token = Uuid::new_v4();
    // Take the extension of the final path component only, so an input like
    // "../../etc/passwd" contributes nothing dangerous.
    let extension = Path::new(original_file_name)
        .file_name()
        .map(Path::new)
        .and_then(|name| name.extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(ext) => format!("{}.{}", token, ext),
        None => token.to_string(),
    }
}
