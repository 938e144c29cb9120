use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Unified error type for folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Media path errors
    #[error("Invalid or potentially unsafe filename detected: {0}")]
    InvalidFilename(String),

    // Content document errors
    #[error("Failed to read content file '{path}': {source}")]
    ContentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse content file '{path}' as JSON: {source}")]
    ContentParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid content structure at '{location}': {reason}")]
    InvalidStructure { location: String, reason: String },

    #[error("Failed to update content file '{path}': {source}")]
    ContentWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // Request validation errors
    #[error("File too large ({size} bytes, max {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error(
        "Invalid file type '{0}'. Allowed: image/jpeg, image/png, image/webp, image/gif, image/svg+xml"
    )]
    UnsupportedFileType(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Section '{section}' not found on page '{page}'")]
    SectionNotFound { page: String, section: String },

    // Media file errors
    #[error("Failed to write media file '{name}': {source}")]
    WriteFailed {
        name: String,
        source: std::io::Error,
    },

    #[error("Failed to rename media file '{from}' to '{to}': {source}")]
    RenameFailed {
        from: String,
        to: String,
        source: std::io::Error,
    },

    // Transaction errors
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    // Config errors
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result type alias for folio operations
pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    /// Whether this error is raised by request validation, before anything
    /// on disk has been touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FolioError::InvalidFilename(_)
                | FolioError::FileTooLarge { .. }
                | FolioError::UnsupportedFileType(_)
                | FolioError::MalformedRequest(_)
                | FolioError::SectionNotFound { .. }
        )
    }

    /// Reason carried by a failed transaction, or the full message otherwise.
    pub fn reason(&self) -> String {
        match self {
            FolioError::UpdateFailed(reason) => reason.clone(),
            other => other.to_string(),
        }
    }

    /// Convert to a serializable representation for the admin UI
    pub fn to_serializable(&self) -> SerializableError {
        SerializableError::from(self)
    }
}

/// A serializable representation of FolioError for transport (HTTP, CLI JSON output)
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SerializableError {
    /// Error kind/variant name
    pub kind: String,
    /// Human-readable error message
    pub message: String,
}

impl From<&FolioError> for SerializableError {
    fn from(err: &FolioError) -> Self {
        let kind = match err {
            FolioError::Io(_) => "Io",
            FolioError::InvalidFilename(_) => "InvalidFilename",
            FolioError::ContentRead { .. } => "ContentReadError",
            FolioError::ContentParse { .. } => "ContentParseError",
            FolioError::InvalidStructure { .. } => "InvalidStructure",
            FolioError::ContentWrite { .. } => "ContentWriteError",
            FolioError::FileTooLarge { .. } => "FileTooLarge",
            FolioError::UnsupportedFileType(_) => "UnsupportedFileType",
            FolioError::MalformedRequest(_) => "MalformedRequest",
            FolioError::SectionNotFound { .. } => "SectionNotFound",
            FolioError::WriteFailed { .. } => "WriteFailed",
            FolioError::RenameFailed { .. } => "RenameFailed",
            FolioError::UpdateFailed(_) => "UpdateFailed",
            FolioError::ConfigRead { .. } => "ConfigRead",
            FolioError::ConfigParse(_) => "ConfigParse",
            FolioError::ConfigSerialize(_) => "ConfigSerialize",
        }
        .to_string();

        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<FolioError> for SerializableError {
    fn from(err: FolioError) -> Self {
        SerializableError::from(&err)
    }
}
