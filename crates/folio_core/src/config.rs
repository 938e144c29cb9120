//! Configuration types for Folio.
//!
//! This module provides the [`Config`] struct describing where a site's content
//! document and media directory live and how uploads are limited. Configuration
//! is persisted as TOML (typically `folio.toml` in the site root). Relative paths
//! are resolved against the site root.
//!
//! # Example
//!
//! ```ignore
//! use folio_core::config::Config;
//! use folio_core::fs::RealFileSystem;
//! use std::path::Path;
//!
//! let root = Path::new("/srv/site");
//! let config = Config::load_from_or_default(&RealFileSystem, &root.join("folio.toml"));
//! let media_dir = config.media_dir_in(root);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::fs::FileSystem;

/// Default config file name inside a site root
pub const CONFIG_FILE_NAME: &str = "folio.toml";

/// `Config` is a data structure that represents the parts of Folio that can be configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the JSON content document
    pub content_file: PathBuf,

    /// Flat directory holding uploaded images
    pub media_dir: PathBuf,

    /// URL prefix under which the media serving endpoint exposes files
    pub media_url_prefix: String,

    /// Largest accepted upload, in bytes
    pub max_upload_bytes: u64,

    /// Upper bound for a single filesystem step of a section update, in milliseconds
    pub step_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_file: PathBuf::from("public/content/content.json"),
            media_dir: PathBuf::from("media"),
            media_url_prefix: "/api/media".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            step_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Content document path, resolved against `root` when relative
    pub fn content_file_in(&self, root: &Path) -> PathBuf {
        resolve(root, &self.content_file)
    }

    /// Media directory path, resolved against `root` when relative
    pub fn media_dir_in(&self, root: &Path) -> PathBuf {
        resolve(root, &self.media_dir)
    }

    /// Step timeout as a `Duration`
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    /// Media URL prefix without a trailing slash
    pub fn url_prefix(&self) -> &str {
        self.media_url_prefix.trim_end_matches('/')
    }

    /// Load config from a specific path.
    pub fn load_from<FS: FileSystem>(fs: &FS, path: &Path) -> Result<Self> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| FolioError::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to<FS: FileSystem>(&self, fs: &FS, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs.create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs.write_file(path, &contents)?;
        Ok(())
    }

    /// Load config from `path`, falling back to defaults when the file is absent.
    /// A file that exists but does not parse is still an error.
    pub fn load_from_or_default<FS: FileSystem>(fs: &FS, path: &Path) -> Result<Self> {
        if !fs.exists(path) {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load_from(fs, path)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
