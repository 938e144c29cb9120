//! Native filesystem implementation.

use std::fs;
use std::io::Result;
use std::path::{Path, PathBuf};

use super::FileSystem;

#[derive(Debug, Clone, Copy, Default)]
/// This is a simple filesystem implementation that simply maps to std::fs methods
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content)
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_binary(&self, path: &Path, content: &[u8]) -> Result<()> {
        fs::write(path, content)
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        path.try_exists().unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if dir.is_dir() {
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    files.push(entry.path());
                }
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_skips_directories() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("a.png"), b"a").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();

        let files = RealFileSystem.list_files(temp.path()).unwrap();
        assert_eq!(files, vec![temp.path().join("a.png")]);
    }

    #[test]
    fn test_list_files_missing_dir_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let files = RealFileSystem
            .list_files(&temp.path().join("missing"))
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_rename_replaces_destination() {
        let temp = tempfile::tempdir().unwrap();
        let from = temp.path().join("new.png");
        let to = temp.path().join("old.png");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();

        RealFileSystem.rename(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"new");
    }
}
