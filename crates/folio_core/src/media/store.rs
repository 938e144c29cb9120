use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, error, warn};

use super::naming::{self, VersionedName};
use super::path::resolve_media_path;
use crate::error::{FolioError, Result};
use crate::fs::FileSystem;

/// Primitive operations on the flat media directory.
///
/// Every method takes plain file names and routes them through
/// [`resolve_media_path`] before touching the filesystem.
#[derive(Debug, Clone)]
pub struct MediaStore<FS: FileSystem> {
    fs: FS,
    dir: PathBuf,
}

impl<FS: FileSystem> MediaStore<FS> {
    /// Create a store over `dir`
    pub fn new(fs: FS, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    /// The media directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a file name to its path inside the media directory
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        resolve_media_path(&self.dir, name)
    }

    /// Whether `name` exists. Invalid names and lookup errors report `false`.
    pub fn exists(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        match self.resolve(name) {
            Ok(path) => self.fs.exists(&path),
            Err(_) => false,
        }
    }

    /// Best-effort delete. A missing file is not an error; other failures are logged.
    pub fn delete(&self, name: &str) {
        let path = match self.resolve(name) {
            Ok(path) => path,
            Err(e) => {
                error!("Refusing to delete media file: {}", e);
                return;
            }
        };
        match self.fs.delete_file(&path) {
            Ok(()) => debug!("Deleted media file: {:?}", path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => error!("Error deleting media file {:?}: {}", path, e),
        }
    }

    /// Rename `old_name` to `new_name` inside the media directory.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let rename_failed = |source: Error| FolioError::RenameFailed {
            from: old_name.to_string(),
            to: new_name.to_string(),
            source,
        };
        let old_path = self
            .resolve(old_name)
            .map_err(|e| rename_failed(Error::new(ErrorKind::InvalidInput, e.to_string())))?;
        let new_path = self
            .resolve(new_name)
            .map_err(|e| rename_failed(Error::new(ErrorKind::InvalidInput, e.to_string())))?;

        self.fs
            .rename(&old_path, &new_path)
            .map_err(rename_failed)?;
        debug!("Renamed media file {} to {}", old_name, new_name);
        Ok(())
    }

    /// Write a new media file, creating the media directory if needed.
    pub fn write_new(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(name)?;
        let write_failed = |source: Error| FolioError::WriteFailed {
            name: name.to_string(),
            source,
        };
        self.fs.create_dir_all(&self.dir).map_err(write_failed)?;
        self.fs.write_binary(&path, bytes).map_err(write_failed)?;
        debug!("Saved media file {:?} ({} bytes)", path, bytes.len());
        Ok(path)
    }

    /// Read a media file's bytes
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        Ok(self.fs.read_binary(&path)?)
    }

    /// File names in the media directory, sorted. A missing directory is empty.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .fs
            .list_files(&self.dir)?
            .into_iter()
            .filter_map(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Find the file backing `base_name`, if any.
    pub fn find_actual_file(&self, base_name: &str) -> Option<String> {
        let listing = match self.list() {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Could not list media directory {:?}: {}", self.dir, e);
                return None;
            }
        };
        naming::find_actual_file(&listing, base_name).map(str::to_string)
    }

    /// Allocate the next `<root>_v<N>` name. Fails if the directory cannot be
    /// read or no version number is left for `root`.
    pub fn next_versioned_name(&self, root: &str, ext: &str) -> Result<VersionedName> {
        let listing = self.list()?;
        naming::next_versioned_name(&listing, root, ext).ok_or_else(|| {
            FolioError::UpdateFailed(format!("no version number left for media file '{root}'"))
        })
    }
}
