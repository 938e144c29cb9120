//! In-memory filesystem implementation.

use std::collections::{HashMap, HashSet};
use std::io::{Error, ErrorKind, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::FileSystem;

/// An in-memory filesystem implementation
/// Useful for testing and for embedding the library without disk access.
/// Clones share the same underlying tree.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileSystem {
    /// Files stored as path -> bytes
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
    /// Directories that exist (implicitly created when files are added)
    directories: Arc<RwLock<HashSet<PathBuf>>>,
}

impl InMemoryFileSystem {
    /// Create a new empty in-memory filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (builder pattern), creating its parent directories
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        let path = Self::normalize_path(path.as_ref());
        self.add_parents(&path);
        self.files
            .write()
            .unwrap()
            .insert(path, content.as_ref().to_vec());
        self
    }

    /// Helper to normalize paths (remove . and .. components where possible)
    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop();
                }
                c => components.push(c),
            }
        }
        components.iter().collect()
    }

    fn add_parents(&self, path: &Path) {
        let mut dirs = self.directories.write().unwrap();
        let mut current = path;
        while let Some(parent) = current.parent() {
            if !parent.as_os_str().is_empty() {
                dirs.insert(parent.to_path_buf());
            }
            current = parent;
        }
    }

    fn not_found(path: &Path) -> Error {
        Error::new(ErrorKind::NotFound, format!("File not found: {:?}", path))
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read_binary(path)?;
        String::from_utf8(bytes).map_err(|e| Error::new(ErrorKind::InvalidData, e))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        self.write_binary(path, content.as_bytes())
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        let normalized = Self::normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&normalized)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn write_binary(&self, path: &Path, content: &[u8]) -> Result<()> {
        let normalized = Self::normalize_path(path);
        if self.directories.read().unwrap().contains(&normalized) {
            return Err(Error::new(
                ErrorKind::IsADirectory,
                format!("Is a directory: {:?}", path),
            ));
        }
        self.add_parents(&normalized);
        self.files
            .write()
            .unwrap()
            .insert(normalized, content.to_vec());
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        let normalized = Self::normalize_path(path);
        match self.files.write().unwrap().remove(&normalized) {
            Some(_) => Ok(()),
            None => Err(Self::not_found(path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from_normalized = Self::normalize_path(from);
        let to_normalized = Self::normalize_path(to);
        let mut files = self.files.write().unwrap();
        let content = files
            .remove(&from_normalized)
            .ok_or_else(|| Self::not_found(from))?;
        drop(files);
        self.add_parents(&to_normalized);
        self.files.write().unwrap().insert(to_normalized, content);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let normalized = Self::normalize_path(path);
        self.files.read().unwrap().contains_key(&normalized)
            || self.directories.read().unwrap().contains(&normalized)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let normalized = Self::normalize_path(path);
        self.directories.read().unwrap().contains(&normalized)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let normalized = Self::normalize_path(path);
        if self.files.read().unwrap().contains_key(&normalized) {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("File exists at directory path: {:?}", path),
            ));
        }
        self.add_parents(&normalized);
        self.directories.write().unwrap().insert(normalized);
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let normalized = Self::normalize_path(dir);
        let mut files: Vec<PathBuf> = self
            .files
            .read()
            .unwrap()
            .keys()
            .filter(|path| path.parent() == Some(normalized.as_path()))
            .cloned()
            .collect();
        files.sort();
        Ok(files)
    }
}
