//! Media directory audit.
//!
//! Checks the media directory against the content document: base names shared
//! by more than one file (lookups would pick one by extension priority), image
//! fields with no backing file, and `prev-` shadows waiting for cleanup.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::document::ContentDocument;
use crate::media::naming::{SHADOW_PREFIX, find_actual_file, split_extension};

/// An audit error: something that renders incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuditError {
    /// An image field names a base name with no matching file.
    MissingImage {
        /// `page.section.field`
        field: String,
        /// The base name that could not be resolved
        base_name: String,
    },
}

/// An audit warning: harmless now, but worth a look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuditWarning {
    /// Several files share one base name.
    DuplicateBaseName {
        /// The shared base name
        base_name: String,
        /// Files carrying it
        files: Vec<String>,
    },
    /// A superseded file kept aside by a replacement or clear.
    ShadowFile {
        /// The shadow file name
        file: String,
    },
}

/// Result of auditing a site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditReport {
    /// Broken references
    pub errors: Vec<AuditError>,
    /// Duplicates and shadows
    pub warnings: Vec<AuditWarning>,
    /// Number of media files looked at
    pub files_checked: usize,
}

impl AuditReport {
    /// Returns true if no errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if there are any errors or warnings.
    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }
}

/// Audit `listing` (media directory file names) against `document`.
pub fn check_site(document: &ContentDocument, listing: &[String]) -> AuditReport {
    let mut report = AuditReport::default();
    let mut by_base: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for file in listing {
        if file.starts_with('.') {
            continue;
        }
        report.files_checked += 1;
        if file.starts_with(SHADOW_PREFIX) {
            report.warnings.push(AuditWarning::ShadowFile { file: file.clone() });
        }
        let (base, _) = split_extension(file);
        by_base.entry(base).or_default().push(file.clone());
    }

    for (base_name, files) in by_base {
        if files.len() > 1 {
            warn!(
                "Base name \"{}\" corresponds to files: {}",
                base_name,
                files.join(", ")
            );
            report.warnings.push(AuditWarning::DuplicateBaseName {
                base_name: base_name.to_string(),
                files,
            });
        }
    }

    document.for_each_image_field(|path, value| {
        if !value.is_empty() && find_actual_file(listing, value).is_none() {
            report.errors.push(AuditError::MissingImage {
                field: path.to_string(),
                base_name: value.to_string(),
            });
        }
    });

    report
}
