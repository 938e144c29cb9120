//! Filename resolution for media files.
//!
//! The content document stores image *base names* (no extension). These helpers
//! map a base name to the file actually present in a media directory listing,
//! allocate versioned names for replacements and derive safe base names from
//! uploaded file names.

use super::ImageType;

/// Supported image extensions, in lookup priority order.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = [".jpeg", ".jpg", ".png", ".webp", ".gif", ".svg"];

/// Prefix of superseded files kept aside for manual recovery.
pub const SHADOW_PREFIX: &str = "prev-";

const VERSION_MARKER: &str = "_v";

/// A base name allocated for a replacement upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedName {
    /// New base name, e.g. `logo_v4`
    pub base: String,
    /// Base name plus the upload's extension, e.g. `logo_v4.png`
    pub file_name: String,
}

/// Finds the file backing `base_name` in a directory listing.
///
/// Extensions are tried in [`SUPPORTED_EXTENSIONS`] order and the first match
/// wins, independent of listing order.
pub fn find_actual_file<'a>(listing: &'a [String], base_name: &str) -> Option<&'a str> {
    if base_name.is_empty() {
        return None;
    }
    SUPPORTED_EXTENSIONS.iter().find_map(|ext| {
        let candidate = format!("{base_name}{ext}");
        listing
            .iter()
            .find(|entry| **entry == candidate)
            .map(String::as_str)
    })
}

/// Parses `<root>_v<N>` followed by nothing or an extension, returning `N`.
fn version_of(entry: &str, root: &str) -> Option<u32> {
    let rest = entry.strip_prefix(root)?.strip_prefix(VERSION_MARKER)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let tail = &rest[digits_end..];
    if !tail.is_empty() && !tail.starts_with('.') {
        return None;
    }
    rest[..digits_end].parse().ok()
}

/// Allocates the next versioned base name for `root`.
///
/// Scans the listing for `<root>_v<N><ext>` (including `prev-` shadows, so a
/// version number is never handed out twice) and returns `<root>_v<max+1>`.
/// Returns `None` once the version space for `root` is exhausted.
pub fn next_versioned_name(listing: &[String], root: &str, ext: &str) -> Option<VersionedName> {
    let highest = listing
        .iter()
        .filter_map(|entry| version_of(entry.trim_start_matches(SHADOW_PREFIX), root))
        .max()
        .unwrap_or(0);

    let next = highest.checked_add(1)?;
    let base = format!("{root}{VERSION_MARKER}{next}");
    let file_name = format!("{base}{ext}");
    Some(VersionedName { base, file_name })
}

/// Strips a trailing `_v<N>` suffix: `logo_v3` becomes `logo`.
pub fn strip_version_suffix(base_name: &str) -> &str {
    if let Some(idx) = base_name.rfind(VERSION_MARKER) {
        let digits = &base_name[idx + VERSION_MARKER.len()..];
        if idx > 0 && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return &base_name[..idx];
        }
    }
    base_name
}

/// Name of the shadow file a superseded `file_name` is moved to.
pub fn shadow_name(file_name: &str) -> String {
    format!("{SHADOW_PREFIX}{file_name}")
}

/// First shadow name for `file_name` not already in the listing. An existing
/// `prev-pic.png` pushes the next one to `prev-prev-pic.png`.
pub fn free_shadow_name(listing: &[String], file_name: &str) -> String {
    let mut shadow = shadow_name(file_name);
    while listing.iter().any(|entry| *entry == shadow) {
        shadow = shadow_name(&shadow);
    }
    shadow
}

/// Splits `name` into stem and extension (with dot) at the last `.`.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx..])),
        _ => (name, None),
    }
}

/// Derives a safe base-name fragment from an uploaded file's original name.
///
/// Directory components and the extension are dropped, the rest is lowercased
/// and every character outside `[a-z0-9_-]` becomes `_`. Falls back to `image`.
pub fn sanitize_upload_stem(original_name: &str) -> String {
    let file_name = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let (stem, _) = split_extension(file_name);
    let sanitized: String = stem
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.chars().all(|c| c == '_') {
        "image".to_string()
    } else {
        sanitized
    }
}

/// Extension to store an upload under: the uploaded name's own extension when
/// it is supported, otherwise the default for the declared media type.
pub fn upload_extension(original_name: &str, image_type: ImageType) -> String {
    match split_extension(original_name).1 {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                ext
            } else {
                image_type.extension().to_string()
            }
        }
        None => image_type.extension().to_string(),
    }
}
