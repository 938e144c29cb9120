use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::document::ContentDocument;
use crate::error::{FolioError, Result};
use crate::fs::FileSystem;

/// Reads and rewrites the JSON content document as a whole.
#[derive(Debug, Clone)]
pub struct ContentStore<FS: FileSystem> {
    fs: FS,
    path: PathBuf,
    media_url_prefix: String,
}

impl<FS: FileSystem> ContentStore<FS> {
    /// Create a store for the document at `path`. `media_url_prefix` is
    /// stripped from image references on write.
    pub fn new(fs: FS, path: impl Into<PathBuf>, media_url_prefix: impl Into<String>) -> Self {
        Self {
            fs,
            path: path.into(),
            media_url_prefix: media_url_prefix.into(),
        }
    }

    /// Location of the document file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document.
    pub fn read(&self) -> Result<ContentDocument> {
        let text = self.fs.read_to_string(&self.path).map_err(|e| {
            error!("Error reading content file {:?}: {}", self.path, e);
            FolioError::ContentRead {
                path: self.path.clone(),
                source: e,
            }
        })?;

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            error!("Error parsing JSON from {:?}: {}", self.path, e);
            FolioError::ContentParse {
                path: self.path.clone(),
                source: e,
            }
        })?;

        ContentDocument::from_value(value)
    }

    /// Persist the document, reducing every image reference to a bare base name first.
    pub fn write(&self, document: &ContentDocument) -> Result<()> {
        let mut cleaned = document.clone();
        cleaned.normalize_image_refs(&self.media_url_prefix);

        let write_error = |source: std::io::Error| {
            error!("Error writing content file {:?}: {}", self.path, source);
            FolioError::ContentWrite {
                path: self.path.clone(),
                source,
            }
        };

        let text = cleaned
            .to_json_pretty()
            .map_err(|e| write_error(std::io::Error::other(e)))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            self.fs.create_dir_all(parent).map_err(write_error)?;
        }
        self.fs.write_file(&self.path, &text).map_err(write_error)?;
        debug!("Content file {:?} updated", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;
    use crate::test_utils::FaultyFs;

    const DOC_PATH: &str = "/site/public/content/content.json";

    fn store_with(content: &str) -> (InMemoryFileSystem, ContentStore<InMemoryFileSystem>) {
        let fs = InMemoryFileSystem::new().with_file(DOC_PATH, content);
        let store = ContentStore::new(fs.clone(), DOC_PATH, "/api/media");
        (fs, store)
    }

    #[test]
    fn test_read_missing_file() {
        let store = ContentStore::new(InMemoryFileSystem::new(), DOC_PATH, "/api/media");
        assert!(matches!(
            store.read().unwrap_err(),
            FolioError::ContentRead { .. }
        ));
    }

    #[test]
    fn test_read_invalid_json() {
        let (_, store) = store_with("{ not json");
        assert!(matches!(
            store.read().unwrap_err(),
            FolioError::ContentParse { .. }
        ));
    }

    #[test]
    fn test_read_non_object_root() {
        let (_, store) = store_with("[]");
        assert!(matches!(
            store.read().unwrap_err(),
            FolioError::InvalidStructure { .. }
        ));
    }

    #[test]
    fn test_write_strips_serving_urls() {
        let (fs, store) = store_with("{}");
        let mut doc = ContentDocument::new();
        doc.set_field("home", "hero", "image", "/api/media/pic.png");
        doc.set_field("home", "hero", "backgroundImage", "bg.webp");
        doc.set_field("home", "hero", "title", "v1.0");
        store.write(&doc).unwrap();

        let written = fs.read_to_string(Path::new(DOC_PATH)).unwrap();
        let reread = store.read().unwrap();
        assert_eq!(reread.field("home", "hero", "image"), Some("pic"));
        assert_eq!(reread.field("home", "hero", "backgroundImage"), Some("bg"));
        assert_eq!(reread.field("home", "hero", "title"), Some("v1.0"));
        assert!(!written.contains("/api/media"));
    }

    #[test]
    fn test_write_read_is_byte_stable() {
        let (fs, store) = store_with(
            r#"{"home":{"hero":{"title":"Hi","image":"/api/media/pic.png","n":1}},"about":{}}"#,
        );
        let doc = store.read().unwrap();
        store.write(&doc).unwrap();
        let first = fs.read_to_string(Path::new(DOC_PATH)).unwrap();

        let doc = store.read().unwrap();
        store.write(&doc).unwrap();
        let second = fs.read_to_string(Path::new(DOC_PATH)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_failure_is_content_write_error() {
        let fs = FaultyFs::new(InMemoryFileSystem::new().with_file(DOC_PATH, "{}"));
        fs.fail_writes_to(DOC_PATH);
        let store = ContentStore::new(fs, DOC_PATH, "/api/media");
        let err = store.write(&ContentDocument::new()).unwrap_err();
        assert!(matches!(err, FolioError::ContentWrite { .. }));
    }
}
