//! Shared test helpers: a fault-injecting filesystem wrapper and a recording
//! cache invalidator.

use std::io::{Error, ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::fs::FileSystem;
use crate::invalidate::CacheInvalidator;
use crate::update::UploadedImage;

#[derive(Debug, Default)]
struct Faults {
    fail_paths: Vec<PathBuf>,
    fail_patterns: Vec<String>,
    fail_rename_sources: Vec<String>,
    binary_write_delay: Option<Duration>,
}

/// Wraps a filesystem and makes chosen writes or renames fail, or writes stall.
/// Clones share the same fault settings.
#[derive(Debug, Clone)]
pub struct FaultyFs<F> {
    inner: F,
    faults: Arc<Mutex<Faults>>,
}

impl<F: FileSystem> FaultyFs<F> {
    /// Wrap `inner` with no faults configured
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    /// Fail every write to exactly `path`
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.faults.lock().unwrap().fail_paths.push(path.into());
    }

    /// Fail every write whose path contains `pattern`
    pub fn fail_writes_matching(&self, pattern: &str) {
        self.faults
            .lock()
            .unwrap()
            .fail_patterns
            .push(pattern.to_string());
    }

    /// Fail every rename whose source path contains `pattern`
    pub fn fail_renames_from(&self, pattern: &str) {
        self.faults
            .lock()
            .unwrap()
            .fail_rename_sources
            .push(pattern.to_string());
    }

    /// Sleep for `delay` before every binary write
    pub fn delay_binary_writes(&self, delay: Duration) {
        self.faults.lock().unwrap().binary_write_delay = Some(delay);
    }

    fn check_write(&self, path: &Path) -> Result<()> {
        let faults = self.faults.lock().unwrap();
        let text = path.to_string_lossy();
        if faults.fail_paths.iter().any(|p| p == path)
            || faults.fail_patterns.iter().any(|p| text.contains(p.as_str()))
        {
            return Err(Error::new(
                ErrorKind::PermissionDenied,
                format!("injected write failure: {}", text),
            ));
        }
        Ok(())
    }
}

impl<F: FileSystem> FileSystem for FaultyFs<F> {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        self.check_write(path)?;
        self.inner.write_file(path, content)
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read_binary(path)
    }

    fn write_binary(&self, path: &Path, content: &[u8]) -> Result<()> {
        let delay = self.faults.lock().unwrap().binary_write_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.check_write(path)?;
        self.inner.write_binary(path, content)
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        self.inner.delete_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let source = from.to_string_lossy();
        let blocked = self
            .faults
            .lock()
            .unwrap()
            .fail_rename_sources
            .iter()
            .any(|p| source.contains(p.as_str()));
        if blocked {
            return Err(Error::new(
                ErrorKind::PermissionDenied,
                format!("injected rename failure: {}", source),
            ));
        }
        self.inner.rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.inner.create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.inner.list_files(dir)
    }
}

/// Invalidator that remembers every path it was handed.
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingInvalidator {
    /// Paths invalidated so far, in order
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn invalidate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

/// A PNG upload of `size` zero bytes for `field_key`
pub fn png_upload(field_key: &str, file_name: &str, size: usize) -> UploadedImage {
    UploadedImage::new(field_key, file_name, "image/png", vec![0; size])
}
