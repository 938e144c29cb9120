//! Render cache for the public content endpoints.
//!
//! Holds the last renderable document. Any invalidation signal from the core
//! drops it; the next request re-reads from disk.

use std::sync::RwLock;

use folio_core::document::ContentDocument;
use folio_core::invalidate::CacheInvalidator;
use tracing::debug;

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    content: Option<ContentDocument>,
}

/// Process-wide cache of the renderable document.
///
/// Every clear bumps a generation counter. A reader captures the generation
/// before rendering and hands it back to [`RenderCache::put`], which drops the
/// document if an invalidation happened in between.
#[derive(Debug, Default)]
pub struct RenderCache {
    slot: RwLock<Slot>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached document, if any
    pub fn get(&self) -> Option<ContentDocument> {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .content
            .clone()
    }

    /// Current generation, to pass to [`RenderCache::put`] after rendering
    pub fn generation(&self) -> u64 {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).generation
    }

    /// Store a document rendered at `generation`.
    /// Returns false, storing nothing, if the cache was cleared since.
    pub fn put(&self, document: ContentDocument, generation: u64) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        if slot.generation != generation {
            debug!(
                "Discarding document rendered at generation {} (now {})",
                generation, slot.generation
            );
            return false;
        }
        slot.content = Some(document);
        true
    }

    /// Drop the cached document
    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        slot.generation = slot.generation.wrapping_add(1);
        slot.content = None;
    }
}

impl CacheInvalidator for RenderCache {
    fn invalidate(&self, path: &str) {
        // Every page is rendered from the one document.
        debug!("Invalidating render cache for {}", path);
        self.clear();
    }
}
