//! Filesystem abstraction module.
//!
//! This module provides the `FileSystem` trait for abstracting filesystem operations,
//! so the content store, the media store and the section update transaction can run
//! against the real disk or against an in-memory tree (tests, embedding).
//!
//! Implementations:
//!
//! - [`RealFileSystem`]: maps directly to `std::fs`
//! - [`InMemoryFileSystem`]: shared in-memory tree, cheap to clone

mod memory;
mod native;

pub use memory::InMemoryFileSystem;
pub use native::RealFileSystem;

use std::io::Result;
use std::path::{Path, PathBuf};

/// Abstraction over filesystem operations
/// Send + Sync required for multi-threaded environments (e.g., the HTTP server)
pub trait FileSystem: Send + Sync {
    /// Reads a UTF-8 text file (the content document, config)
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Creates or truncates a text file with the given content
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;

    /// Reads binary file content (media files)
    fn read_binary(&self, path: &Path) -> Result<Vec<u8>>;

    /// Creates or truncates a binary file with the given content
    fn write_binary(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Deletes a file
    fn delete_file(&self, path: &Path) -> Result<()>;

    /// Renames a file. An existing destination file is replaced.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Checks if a file or directory exists. Errors while checking count as absent.
    fn exists(&self, path: &Path) -> bool;

    /// Checks if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Creates a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Lists the regular files directly inside a directory (not recursive).
    /// A missing directory yields an empty list.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;
}

// Blanket implementation for references to FileSystem
impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        (**self).read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        (**self).write_file(path, content)
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        (**self).read_binary(path)
    }

    fn write_binary(&self, path: &Path, content: &[u8]) -> Result<()> {
        (**self).write_binary(path, content)
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        (**self).delete_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        (**self).rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        (**self).create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        (**self).list_files(dir)
    }
}
