//! Section update transaction.
//!
//! A [`SectionUpdate`] carries one admin form submission for a single section:
//! plain text edits, image uploads and image clears. [`SectionTransaction`]
//! applies it to the content document and the media directory as one unit.
//!
//! Every file written or renamed before the document is persisted is recorded in
//! a [`Journal`]. If any later step fails the journal is replayed backwards
//! (new files deleted, shadowed files renamed back), leaving the media directory
//! consistent with the untouched document on disk.
//!
//! Replacing an image never deletes or overwrites the old file: the field gets
//! a fresh `<root>_v<N>` base name and every other field in the document that
//! referenced the old base name is moved along with it.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::document::{ContentDocument, Section, is_image_field};
use crate::error::{FolioError, Result};
use crate::fs::FileSystem;
use crate::invalidate::{ADMIN_PATH, CacheInvalidator, page_path};
use crate::media::naming::{
    find_actual_file, free_shadow_name, sanitize_upload_stem, strip_version_suffix,
    upload_extension,
};
use crate::media::{ImageType, MediaStore};
use crate::store::ContentStore;

/// An uploaded image destined for one image field.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Image field the upload is for
    pub field_key: String,
    /// Original file name as sent by the client
    pub file_name: String,
    /// Declared media type
    pub media_type: String,
    /// File content
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Create an upload for `field_key`
    pub fn new(
        field_key: impl Into<String>,
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field_key: field_key.into(),
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// A file part from a multipart form, before it is paired with its field key.
#[derive(Debug, Clone)]
pub struct FormFile {
    /// Original file name
    pub file_name: String,
    /// Declared media type
    pub media_type: String,
    /// File content
    pub bytes: Vec<u8>,
}

/// One form submission for a page section.
#[derive(Debug, Clone, Default)]
pub struct SectionUpdate {
    /// Page key
    pub page: String,
    /// Section key
    pub section: String,
    /// Submitted field values. Image fields only matter when cleared to `""`.
    pub fields: IndexMap<String, String>,
    /// Image uploads
    pub uploads: Vec<UploadedImage>,
}

impl SectionUpdate {
    /// Start an empty update for `page`/`section`
    pub fn new(page: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            section: section.into(),
            ..Self::default()
        }
    }

    /// Add a submitted field value (builder pattern)
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Request clearing an image field (builder pattern)
    pub fn with_cleared_image(self, key: impl Into<String>) -> Self {
        self.with_field(key, "")
    }

    /// Add an upload (builder pattern)
    pub fn with_upload(mut self, upload: UploadedImage) -> Self {
        self.uploads.push(upload);
        self
    }

    /// Build an update from the admin form encoding: a JSON object of field
    /// values plus file parts paired positionally with their field keys.
    pub fn from_form(
        page: impl Into<String>,
        section: impl Into<String>,
        section_data_json: &str,
        files: Vec<FormFile>,
        field_keys: Vec<String>,
    ) -> Result<Self> {
        let parsed: Value = serde_json::from_str(section_data_json).map_err(|e| {
            FolioError::MalformedRequest(format!("invalid section data format ({e})"))
        })?;
        let Value::Object(map) = parsed else {
            return Err(FolioError::MalformedRequest(
                "section data is not an object".to_string(),
            ));
        };

        let mut fields = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(FolioError::MalformedRequest(format!(
                        "field '{key}' must be a string"
                    )));
                }
            };
            fields.insert(key, text);
        }

        if files.len() != field_keys.len() {
            return Err(FolioError::MalformedRequest(format!(
                "{} image file(s) provided for {} field key(s)",
                files.len(),
                field_keys.len()
            )));
        }

        let uploads = files
            .into_iter()
            .zip(field_keys)
            .map(|(file, field_key)| UploadedImage {
                field_key,
                file_name: file.file_name,
                media_type: file.media_type,
                bytes: file.bytes,
            })
            .collect();

        Ok(Self {
            page: page.into(),
            section: section.into(),
            fields,
            uploads,
        })
    }

    /// Check the request before anything on disk is touched.
    pub fn validate(&self, max_upload_bytes: u64) -> Result<()> {
        if self.page.trim().is_empty() || self.section.trim().is_empty() {
            return Err(FolioError::MalformedRequest(
                "page and section keys are required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for upload in &self.uploads {
            if !is_image_field(&upload.field_key) {
                return Err(FolioError::MalformedRequest(format!(
                    "invalid image field key: {}",
                    upload.field_key
                )));
            }
            if !seen.insert(upload.field_key.as_str()) {
                return Err(FolioError::MalformedRequest(format!(
                    "more than one file for image field '{}'",
                    upload.field_key
                )));
            }
            let size = upload.bytes.len() as u64;
            if size > max_upload_bytes {
                return Err(FolioError::FileTooLarge {
                    size,
                    limit: max_upload_bytes,
                });
            }
            if ImageType::from_mime(&upload.media_type).is_none() {
                return Err(FolioError::UnsupportedFileType(upload.media_type.clone()));
            }
        }
        Ok(())
    }
}

/// Result shape handed back to the admin UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UpdateOutcome {
    /// Whether the section was saved
    pub success: bool,
    /// Message to show verbatim
    pub message: String,
    /// Saved section, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub updated_section: Option<IndexMap<String, String>>,
}

impl UpdateOutcome {
    /// Translate a transaction result into the UI result shape.
    pub fn from_result(page: &str, section: &str, result: Result<Section>) -> Self {
        match result {
            Ok(updated) => Self {
                success: true,
                message: format!("Section '{section}' on page '{page}' updated successfully!"),
                updated_section: Some(updated),
            },
            Err(FolioError::UpdateFailed(reason)) => Self {
                success: false,
                message: format!("Failed to update section '{section}'. Reason: {reason}"),
                updated_section: None,
            },
            Err(other) => Self {
                success: false,
                message: other.to_string(),
                updated_section: None,
            },
        }
    }
}

/// A compensating action for a filesystem change made during the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Compensation {
    /// A new file was written; undo by deleting it.
    Delete { name: String },
    /// `original` was moved to `shadow`; undo by moving it back.
    RenameBack { shadow: String, original: String },
}

/// Ordered log of filesystem changes, undone in reverse on failure.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    entries: Vec<Compensation>,
}

impl Journal {
    fn record_write(&mut self, name: impl Into<String>) {
        self.entries.push(Compensation::Delete { name: name.into() });
    }

    fn record_rename(&mut self, original: impl Into<String>, shadow: impl Into<String>) {
        self.entries.push(Compensation::RenameBack {
            shadow: shadow.into(),
            original: original.into(),
        });
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Undo every recorded change, newest first. Failures are logged and skipped.
    fn rollback<FS: FileSystem>(self, media: &MediaStore<FS>) {
        for entry in self.entries.into_iter().rev() {
            match entry {
                Compensation::Delete { name } => {
                    warn!("Rollback: removing new media file {}", name);
                    media.delete(&name);
                }
                Compensation::RenameBack { shadow, original } => {
                    warn!("Rollback: restoring {} from {}", original, shadow);
                    if let Err(e) = media.rename(&shadow, &original) {
                        error!("Rollback failed to restore {}: {}", original, e);
                    }
                }
            }
        }
    }
}

/// Executes one [`SectionUpdate`] against a content store and a media store.
pub struct SectionTransaction<'a, FS: FileSystem> {
    content: &'a ContentStore<FS>,
    media: &'a MediaStore<FS>,
    invalidator: &'a dyn CacheInvalidator,
    media_url_prefix: &'a str,
    max_upload_bytes: u64,
    step_timeout: Duration,
}

impl<'a, FS: FileSystem> SectionTransaction<'a, FS> {
    /// Wire up a transaction
    pub fn new(
        content: &'a ContentStore<FS>,
        media: &'a MediaStore<FS>,
        invalidator: &'a dyn CacheInvalidator,
        media_url_prefix: &'a str,
    ) -> Self {
        Self {
            content,
            media,
            invalidator,
            media_url_prefix,
            max_upload_bytes: 5 * 1024 * 1024,
            step_timeout: Duration::from_secs(10),
        }
    }

    /// Override the upload size limit
    pub fn max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Override the per-step time budget
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Apply the update and return the saved section.
    ///
    /// Validation and document read errors are returned as-is. Anything failing
    /// after the first media write is rolled back and surfaces as
    /// [`FolioError::UpdateFailed`].
    pub fn run(&self, update: &SectionUpdate) -> Result<Section> {
        update.validate(self.max_upload_bytes)?;

        let mut document = self.content.read()?;
        document.normalize_image_refs(self.media_url_prefix);

        if document.section(&update.page, &update.section).is_none() {
            return Err(FolioError::SectionNotFound {
                page: update.page.clone(),
                section: update.section.clone(),
            });
        }

        let mut journal = Journal::default();
        if let Err(e) = self.apply(&mut document, update, &mut journal) {
            if !journal.is_empty() {
                self.rollback(journal);
            }
            return Err(FolioError::UpdateFailed(e.reason()));
        }

        let updated = document
            .section(&update.page, &update.section)
            .cloned()
            .unwrap_or_default();

        self.invalidator.invalidate(&page_path(&update.page));
        self.invalidator.invalidate(ADMIN_PATH);

        info!(
            "Section {}/{} updated ({} upload(s))",
            update.page,
            update.section,
            update.uploads.len()
        );
        Ok(updated)
    }

    fn rollback(&self, journal: Journal) {
        journal.rollback(self.media);
    }

    fn apply(
        &self,
        document: &mut ContentDocument,
        update: &SectionUpdate,
        journal: &mut Journal,
    ) -> Result<()> {
        let page = update.page.as_str();
        let section = update.section.as_str();

        // Uploads: pick a base name per field, write the file.
        let mut replacements: Vec<(String, String)> = Vec::new();
        let mut uploaded: HashSet<&str> = HashSet::new();
        for upload in &update.uploads {
            let image_type = ImageType::from_mime(&upload.media_type)
                .ok_or_else(|| FolioError::UnsupportedFileType(upload.media_type.clone()))?;
            let ext = upload_extension(&upload.file_name, image_type);

            let current = document
                .field(page, section, &upload.field_key)
                .filter(|value| !value.is_empty())
                .map(str::to_string);

            let base = match &current {
                Some(old) => {
                    let started = Instant::now();
                    let versioned = self
                        .media
                        .next_versioned_name(strip_version_suffix(old), &ext)?;
                    self.check_deadline("allocate versioned name", started)?;
                    if versioned.base != *old {
                        replacements.push((old.clone(), versioned.base.clone()));
                    }
                    versioned.base
                }
                None => self.unique_new_base(&upload.file_name)?,
            };

            let file_name = format!("{base}{ext}");
            let started = Instant::now();
            self.media.write_new(&file_name, &upload.bytes)?;
            journal.record_write(file_name.as_str());
            self.check_deadline("write media file", started)?;

            debug!(
                "{}.{}.{}: {} -> {}",
                page,
                section,
                upload.field_key,
                current.as_deref().unwrap_or("<none>"),
                base
            );
            document.set_field(page, section, &upload.field_key, base);
            uploaded.insert(upload.field_key.as_str());
        }

        // Move every other reference to a replaced asset along with it.
        for (old, new) in &replacements {
            let changed = document.replace_base_name(old, new);
            debug!("Synchronized {} additional reference(s) {} -> {}", changed, old, new);
        }

        // Plain text edits. Image fields are owned by the upload and clear steps.
        for (key, value) in &update.fields {
            if is_image_field(key) {
                continue;
            }
            document.set_field(page, section, key, value.as_str());
        }

        // Explicit clears.
        let cleared: Vec<&str> = update
            .fields
            .iter()
            .filter(|(key, value)| {
                is_image_field(key) && value.is_empty() && !uploaded.contains(key.as_str())
            })
            .map(|(key, _)| key.as_str())
            .collect();
        for key in cleared {
            self.clear_image(document, page, section, key, journal)?;
        }

        let started = Instant::now();
        self.content.write(document)?;
        if started.elapsed() > self.step_timeout {
            // The document is committed; undoing media changes now would orphan it.
            warn!(
                "Persisting {:?} took {:?}, over the {:?} step budget",
                self.content.path(),
                started.elapsed(),
                self.step_timeout
            );
        }
        Ok(())
    }

    fn clear_image(
        &self,
        document: &mut ContentDocument,
        page: &str,
        section: &str,
        key: &str,
        journal: &mut Journal,
    ) -> Result<()> {
        let Some(old) = document.field(page, section, key).map(str::to_string) else {
            debug!("Ignoring clear of unknown field {}.{}.{}", page, section, key);
            return Ok(());
        };
        document.set_field(page, section, key, "");
        if old.is_empty() {
            return Ok(());
        }

        let remaining = document.references(&old);
        if remaining > 0 {
            debug!(
                "Keeping {} in place: still referenced by {} field(s)",
                old, remaining
            );
            return Ok(());
        }

        let started = Instant::now();
        let listing = self.media.list()?;
        let Some(actual) = find_actual_file(&listing, &old).map(str::to_string) else {
            debug!("No media file backs cleared image {}", old);
            return Ok(());
        };
        // Never overwrite an older shadow of the same file.
        let shadow = free_shadow_name(&listing, &actual);
        self.media.rename(&actual, &shadow)?;
        journal.record_rename(actual.as_str(), shadow.as_str());
        self.check_deadline("move cleared image aside", started)
    }

    /// `<unix-millis>-<sanitized>`, bumped with a counter if that base is taken.
    fn unique_new_base(&self, original_name: &str) -> Result<String> {
        let stem = sanitize_upload_stem(original_name);
        let stamp = chrono::Utc::now().timestamp_millis();
        let candidate = format!("{stamp}-{stem}");

        let started = Instant::now();
        let listing = self.media.list()?;
        self.check_deadline("list media directory", started)?;

        if find_actual_file(&listing, &candidate).is_none() {
            return Ok(candidate);
        }
        let base = (1u32..)
            .map(|n| format!("{candidate}-{n}"))
            .find(|name| find_actual_file(&listing, name).is_none())
            .unwrap_or(candidate);
        Ok(base)
    }

    fn check_deadline(&self, step: &str, started: Instant) -> Result<()> {
        let elapsed = started.elapsed();
        if elapsed > self.step_timeout {
            return Err(FolioError::UpdateFailed(format!(
                "timeout: {step} took {} ms (limit {} ms)",
                elapsed.as_millis(),
                self.step_timeout.as_millis()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;
    use crate::invalidate::NoopInvalidator;
    use crate::test_utils::{FaultyFs, RecordingInvalidator, png_upload};

    const DOC: &str = "/site/content.json";
    const MEDIA: &str = "/site/media";

    fn stores<FS: FileSystem + Clone>(fs: FS) -> (ContentStore<FS>, MediaStore<FS>) {
        (
            ContentStore::new(fs.clone(), DOC, "/api/media"),
            MediaStore::new(fs, MEDIA),
        )
    }

    fn base_fs() -> InMemoryFileSystem {
        InMemoryFileSystem::new()
            .with_file(
                DOC,
                r#"{
  "home": {"section1": {"title": "Hi", "image1": "logo"}},
  "about": {"section1": {"image2": "logo", "heroImage": "pic"}}
}"#,
            )
            .with_file(format!("{MEDIA}/logo.png"), "old-logo")
            .with_file(format!("{MEDIA}/pic.png"), "pic")
    }

    #[test]
    fn test_from_form_pairs_files_with_keys() {
        let update = SectionUpdate::from_form(
            "home",
            "section1",
            r#"{"title": "Hello", "image1": "", "count": 2, "note": null}"#,
            vec![FormFile {
                file_name: "a.png".into(),
                media_type: "image/png".into(),
                bytes: vec![1, 2, 3],
            }],
            vec!["image1".into()],
        )
        .unwrap();

        assert_eq!(update.fields["title"], "Hello");
        assert_eq!(update.fields["count"], "2");
        assert_eq!(update.fields["note"], "");
        assert_eq!(update.uploads.len(), 1);
        assert_eq!(update.uploads[0].field_key, "image1");
    }

    #[test]
    fn test_from_form_rejects_malformed_input() {
        let err = SectionUpdate::from_form("home", "s", "[1]", vec![], vec![]).unwrap_err();
        assert!(matches!(err, FolioError::MalformedRequest(_)));

        let err = SectionUpdate::from_form("home", "s", "{", vec![], vec![]).unwrap_err();
        assert!(matches!(err, FolioError::MalformedRequest(_)));

        let err =
            SectionUpdate::from_form("home", "s", "{}", vec![], vec!["image".into()]).unwrap_err();
        assert!(matches!(err, FolioError::MalformedRequest(_)));
    }

    #[test]
    fn test_validate() {
        let ok = SectionUpdate::new("home", "s").with_upload(png_upload("image", "a.png", 10));
        assert!(ok.validate(100).is_ok());

        let big = SectionUpdate::new("home", "s").with_upload(png_upload("image", "a.png", 101));
        assert!(matches!(
            big.validate(100).unwrap_err(),
            FolioError::FileTooLarge { size: 101, limit: 100 }
        ));

        let pdf = SectionUpdate::new("home", "s").with_upload(UploadedImage::new(
            "image",
            "a.pdf",
            "application/pdf",
            vec![0],
        ));
        assert!(matches!(
            pdf.validate(100).unwrap_err(),
            FolioError::UnsupportedFileType(_)
        ));

        let wrong_key = SectionUpdate::new("home", "s").with_upload(png_upload("title", "a.png", 1));
        assert!(matches!(
            wrong_key.validate(100).unwrap_err(),
            FolioError::MalformedRequest(_)
        ));

        let twice = SectionUpdate::new("home", "s")
            .with_upload(png_upload("image", "a.png", 1))
            .with_upload(png_upload("image", "b.png", 1));
        assert!(matches!(
            twice.validate(100).unwrap_err(),
            FolioError::MalformedRequest(_)
        ));
    }

    #[test]
    fn test_text_edit_leaves_images_alone() {
        let fs = base_fs();
        let (content, media) = stores(fs.clone());
        let invalidator = RecordingInvalidator::default();
        let tx = SectionTransaction::new(&content, &media, &invalidator, "/api/media");

        let update = SectionUpdate::new("home", "section1")
            .with_field("title", "Hello")
            .with_field("image1", "ignored.png");
        let section = tx.run(&update).unwrap();

        assert_eq!(section["title"], "Hello");
        assert_eq!(section["image1"], "logo");
        assert_eq!(invalidator.paths(), vec!["/", "/admin"]);
        assert_eq!(media.list().unwrap(), vec!["logo.png", "pic.png"]);
    }

    #[test]
    fn test_replacement_versions_and_synchronizes() {
        let fs = base_fs();
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        let update = SectionUpdate::new("home", "section1")
            .with_upload(png_upload("image1", "New Logo.png", 4));
        let section = tx.run(&update).unwrap();

        assert_eq!(section["image1"], "logo_v1");
        let doc = content.read().unwrap();
        assert_eq!(doc.field("about", "section1", "image2"), Some("logo_v1"));
        assert_eq!(doc.field("about", "section1", "heroImage"), Some("pic"));
        // Old file stays until a cleanup pass.
        assert!(media.exists("logo.png"));
        assert!(media.exists("logo_v1.png"));
    }

    #[test]
    fn test_replacement_of_versioned_name_bumps_version() {
        let fs = base_fs().with_file(format!("{MEDIA}/logo_v3.jpg"), "v3");
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        tx.run(&SectionUpdate::new("home", "section1").with_upload(png_upload("image1", "x.png", 1)))
            .unwrap();
        let doc = content.read().unwrap();
        assert_eq!(doc.field("home", "section1", "image1"), Some("logo_v4"));
        assert_eq!(doc.field("about", "section1", "image2"), Some("logo_v4"));
    }

    #[test]
    fn test_new_image_gets_timestamped_name() {
        let fs = InMemoryFileSystem::new().with_file(DOC, r#"{"home": {"hero": {"image": ""}}}"#);
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        let section = tx
            .run(&SectionUpdate::new("home", "hero").with_upload(png_upload("image", "Beach Day.PNG", 3)))
            .unwrap();

        let base = &section["image"];
        let (stamp, rest) = base.split_once('-').unwrap();
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest, "beach_day");
        assert!(media.exists(&format!("{base}.png")));
    }

    #[test]
    fn test_clear_moves_file_aside() {
        let fs = InMemoryFileSystem::new()
            .with_file(DOC, r#"{"home": {"section1": {"title": "Hi", "image1": "pic"}}}"#)
            .with_file(format!("{MEDIA}/pic.png"), "pic");
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        let section = tx
            .run(&SectionUpdate::new("home", "section1").with_cleared_image("image1"))
            .unwrap();

        assert_eq!(section["image1"], "");
        assert!(!media.exists("pic.png"));
        assert!(media.exists("prev-pic.png"));
    }

    #[test]
    fn test_clear_keeps_shared_file() {
        let fs = base_fs();
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        tx.run(&SectionUpdate::new("home", "section1").with_cleared_image("image1"))
            .unwrap();

        let doc = content.read().unwrap();
        assert_eq!(doc.field("home", "section1", "image1"), Some(""));
        assert_eq!(doc.field("about", "section1", "image2"), Some("logo"));
        assert!(media.exists("logo.png"));
    }

    #[test]
    fn test_unknown_section_is_rejected_before_mutation() {
        let fs = base_fs();
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        let err = tx
            .run(&SectionUpdate::new("home", "missing").with_upload(png_upload("image", "a.png", 1)))
            .unwrap_err();
        assert!(matches!(err, FolioError::SectionNotFound { .. }));
        assert_eq!(media.list().unwrap(), vec!["logo.png", "pic.png"]);
    }

    #[test]
    fn test_failed_persist_rolls_back_files() {
        let fs = FaultyFs::new(
            InMemoryFileSystem::new()
                .with_file(
                    DOC,
                    r#"{"home": {"section1": {"image1": "logo", "image2": "pic"}}}"#,
                )
                .with_file(format!("{MEDIA}/logo.png"), "logo")
                .with_file(format!("{MEDIA}/pic.png"), "pic"),
        );
        fs.fail_writes_to(DOC);
        let (content, media) = stores(fs.clone());
        let invalidator = RecordingInvalidator::default();
        let tx = SectionTransaction::new(&content, &media, &invalidator, "/api/media");

        let update = SectionUpdate::new("home", "section1")
            .with_upload(png_upload("image1", "n.png", 2))
            .with_cleared_image("image2");
        let err = tx.run(&update).unwrap_err();

        assert!(matches!(err, FolioError::UpdateFailed(ref reason) if reason.contains("content file")));
        assert_eq!(media.list().unwrap(), vec!["logo.png", "pic.png"]);
        assert!(invalidator.paths().is_empty());
        let doc = content.read().unwrap();
        assert_eq!(doc.field("home", "section1", "image1"), Some("logo"));
    }

    #[test]
    fn test_failed_media_write_rolls_back_earlier_writes() {
        let fs = FaultyFs::new(
            InMemoryFileSystem::new()
                .with_file(DOC, r#"{"home": {"hero": {"image": "", "backgroundImage": ""}}}"#),
        );
        fs.fail_writes_matching("bg");
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        let update = SectionUpdate::new("home", "hero")
            .with_upload(png_upload("image", "front.png", 2))
            .with_upload(png_upload("backgroundImage", "bg.png", 2));
        let err = tx.run(&update).unwrap_err();

        assert!(matches!(err, FolioError::UpdateFailed(_)));
        assert!(media.list().unwrap().is_empty());
    }

    #[test]
    fn test_slow_step_times_out_and_rolls_back() {
        let fs = FaultyFs::new(
            InMemoryFileSystem::new().with_file(DOC, r#"{"home": {"hero": {"image": ""}}}"#),
        );
        fs.delay_binary_writes(Duration::from_millis(50));
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media")
            .step_timeout(Duration::from_millis(5));

        let err = tx
            .run(&SectionUpdate::new("home", "hero").with_upload(png_upload("image", "a.png", 1)))
            .unwrap_err();

        assert!(matches!(err, FolioError::UpdateFailed(ref reason) if reason.starts_with("timeout")));
        assert!(media.list().unwrap().is_empty());
        assert_eq!(content.read().unwrap().field("home", "hero", "image"), Some(""));
    }

    #[test]
    fn test_failed_restore_keeps_persist_error_and_undoes_the_rest() {
        let fs = FaultyFs::new(
            InMemoryFileSystem::new()
                .with_file(
                    DOC,
                    r#"{"home": {"section1": {"image1": "logo", "image2": "pic"}}}"#,
                )
                .with_file(format!("{MEDIA}/logo.png"), "logo")
                .with_file(format!("{MEDIA}/pic.png"), "pic"),
        );
        fs.fail_writes_to(DOC);
        fs.fail_renames_from("prev-");
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        let update = SectionUpdate::new("home", "section1")
            .with_upload(png_upload("image1", "n.png", 2))
            .with_cleared_image("image2");
        let err = tx.run(&update).unwrap_err();

        assert!(matches!(err, FolioError::UpdateFailed(ref reason) if reason.contains("content file")));
        // The shadow could not be moved back, but the new upload was still removed.
        assert_eq!(media.list().unwrap(), vec!["logo.png", "prev-pic.png"]);
        assert_eq!(
            content.read().unwrap().field("home", "section1", "image2"),
            Some("pic")
        );
    }

    #[test]
    fn test_clear_keeps_older_shadow() {
        let fs = InMemoryFileSystem::new()
            .with_file(DOC, r#"{"home": {"section1": {"image1": "pic"}}}"#)
            .with_file(format!("{MEDIA}/pic.png"), "current")
            .with_file(format!("{MEDIA}/prev-pic.png"), "older");
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        tx.run(&SectionUpdate::new("home", "section1").with_cleared_image("image1"))
            .unwrap();

        assert!(!media.exists("pic.png"));
        assert_eq!(media.read("prev-pic.png").unwrap(), b"older");
        assert_eq!(media.read("prev-prev-pic.png").unwrap(), b"current");
    }

    #[test]
    fn test_exhausted_version_fails_cleanly() {
        let fs = base_fs().with_file(format!("{MEDIA}/logo_v4294967295.png"), "last");
        let (content, media) = stores(fs.clone());
        let tx = SectionTransaction::new(&content, &media, &NoopInvalidator, "/api/media");

        let err = tx
            .run(&SectionUpdate::new("home", "section1").with_upload(png_upload("image1", "x.png", 1)))
            .unwrap_err();

        assert!(matches!(err, FolioError::UpdateFailed(ref reason) if reason.contains("no version number left")));
        assert_eq!(
            media.list().unwrap(),
            vec!["logo.png", "logo_v4294967295.png", "pic.png"]
        );
        assert_eq!(content.read().unwrap().field("home", "section1", "image1"), Some("logo"));
    }

    #[test]
    fn test_outcome_messages() {
        let ok = UpdateOutcome::from_result("home", "hero", Ok(Section::new()));
        assert!(ok.success);
        assert_eq!(ok.message, "Section 'hero' on page 'home' updated successfully!");

        let failed = UpdateOutcome::from_result(
            "home",
            "hero",
            Err(FolioError::UpdateFailed("disk full".into())),
        );
        assert!(!failed.success);
        assert_eq!(failed.message, "Failed to update section 'hero'. Reason: disk full");
        assert!(failed.updated_section.is_none());

        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["updatedSection"], serde_json::json!({}));
    }
}
