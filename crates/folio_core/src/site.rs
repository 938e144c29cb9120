//! Site facade.
//!
//! A [`Site`] owns the resolved configuration and the two stores for one site
//! root, and is the entry point the CLI and the HTTP server call into.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::audit::{AuditReport, check_site};
use crate::config::{CONFIG_FILE_NAME, Config};
use crate::document::{ContentDocument, Page, Section};
use crate::error::Result;
use crate::fs::FileSystem;
use crate::invalidate::{CacheInvalidator, NoopInvalidator};
use crate::media::MediaStore;
use crate::render::Renderer;
use crate::store::ContentStore;
use crate::update::{SectionTransaction, SectionUpdate, UpdateOutcome};

/// One site: a content document plus its media directory.
pub struct Site<FS: FileSystem + Clone> {
    root: PathBuf,
    config: Config,
    content: ContentStore<FS>,
    media: MediaStore<FS>,
    invalidator: Arc<dyn CacheInvalidator>,
    // Serializes section updates in this process.
    update_lock: Mutex<()>,
}

impl<FS: FileSystem + Clone> Site<FS> {
    /// Create a site rooted at `root` with an explicit configuration
    pub fn new(fs: FS, root: impl Into<PathBuf>, config: Config) -> Self {
        let root = root.into();
        let content = ContentStore::new(
            fs.clone(),
            config.content_file_in(&root),
            config.url_prefix(),
        );
        let media = MediaStore::new(fs, config.media_dir_in(&root));
        debug!(
            "Site at {:?}: content {:?}, media {:?}",
            root,
            content.path(),
            media.dir()
        );
        Self {
            root,
            config,
            content,
            media,
            invalidator: Arc::new(NoopInvalidator),
            update_lock: Mutex::new(()),
        }
    }

    /// Open a site, loading `config_path` (default `<root>/folio.toml`) when present.
    pub fn open(fs: FS, root: impl Into<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
        let config = Config::load_from_or_default(&fs, &config_path)?;
        Ok(Self::new(fs, root, config))
    }

    /// Attach the rendering layer's cache invalidator (builder pattern)
    pub fn with_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        self.invalidator = invalidator;
        self
    }

    /// Site root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The content document store
    pub fn content_store(&self) -> &ContentStore<FS> {
        &self.content
    }

    /// The media directory store
    pub fn media_store(&self) -> &MediaStore<FS> {
        &self.media
    }

    /// The stored document with every image field reduced to a base name,
    /// as the admin UI edits it.
    pub fn admin_content(&self) -> Result<ContentDocument> {
        let mut document = self.content.read()?;
        document.normalize_image_refs(self.config.url_prefix());
        Ok(document)
    }

    /// The document with servable image references, for page rendering.
    pub fn renderable_content(&self) -> Result<ContentDocument> {
        self.renderer().renderable_content()
    }

    /// One page with servable image references
    pub fn renderable_page(&self, page: &str) -> Result<Option<Page>> {
        self.renderer().renderable_page(page)
    }

    /// Apply a section update as one transaction.
    pub fn update_section(&self, update: &SectionUpdate) -> Result<Section> {
        let _guard = self.update_lock.lock().unwrap_or_else(|e| e.into_inner());
        SectionTransaction::new(
            &self.content,
            &self.media,
            self.invalidator.as_ref(),
            self.config.url_prefix(),
        )
        .max_upload_bytes(self.config.max_upload_bytes)
        .step_timeout(self.config.step_timeout())
        .run(update)
    }

    /// Apply a section update and report it in the admin UI's result shape.
    pub fn update_section_outcome(&self, update: &SectionUpdate) -> UpdateOutcome {
        let result = self.update_section(update);
        UpdateOutcome::from_result(&update.page, &update.section, result)
    }

    /// Audit the media directory against the document.
    pub fn audit(&self) -> Result<AuditReport> {
        let document = self.admin_content()?;
        let listing = self.media.list()?;
        Ok(check_site(&document, &listing))
    }

    fn renderer(&self) -> Renderer<'_, FS> {
        Renderer::new(&self.content, &self.media, self.config.url_prefix())
    }
}
