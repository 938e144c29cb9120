//! Safe media path resolution.

use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{FolioError, Result};

/// Returns the final component of `name`, treating both `/` and `\` as separators.
fn file_name_portion(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Resolves `name` to a path directly inside `media_dir`.
///
/// Directory components are dropped and only the file name is kept, so
/// `uploads/photo.jpg` resolves to `<media_dir>/photo.jpg`. Fails with
/// [`FolioError::InvalidFilename`] for traversal attempts (`..` anywhere in the
/// input), absolute paths, empty names and names with control characters.
pub fn resolve_media_path(media_dir: &Path, name: &str) -> Result<PathBuf> {
    let invalid = || {
        warn!("Rejected unsafe media filename: {:?}", name);
        FolioError::InvalidFilename(name.to_string())
    };

    if name.contains("..") || Path::new(name).is_absolute() || name.starts_with(['/', '\\']) {
        return Err(invalid());
    }

    let base = file_name_portion(name).trim();
    if base.is_empty() || base == "." {
        return Err(invalid());
    }
    if base.chars().any(|c| c.is_control() || c == ':') {
        return Err(invalid());
    }

    // The joined path must have exactly one extra component.
    let resolved = media_dir.join(base);
    if resolved.parent() != Some(media_dir) {
        return Err(invalid());
    }

    Ok(resolved)
}
