//! Turns the stored document into what pages render.
//!
//! Every image field's base name is swapped for a servable reference
//! (`<url_prefix>/<file>`). Fields whose file is missing, or that are empty,
//! become `""` so the page renders without a broken image.

use log::warn;

use crate::document::{ContentDocument, Page, to_base_name};
use crate::error::Result;
use crate::fs::FileSystem;
use crate::media::MediaStore;
use crate::media::naming::find_actual_file;
use crate::store::ContentStore;

/// Rewrite image fields in `document` against a media directory `listing`.
pub fn resolve_image_refs(document: &mut ContentDocument, listing: &[String], url_prefix: &str) {
    let prefix = url_prefix.trim_end_matches('/');
    document.for_each_image_field_mut(|path, value| {
        let base = to_base_name(value, prefix);
        match find_actual_file(listing, &base) {
            Some(file) => *value = format!("{prefix}/{file}"),
            None => {
                if base.is_empty() {
                    warn!("Image field {} is empty", path);
                } else {
                    warn!("Image file not found for {}: base name '{}'", path, base);
                }
                value.clear();
            }
        }
    });
}

/// Reads content and resolves image references for rendering.
#[derive(Debug, Clone)]
pub struct Renderer<'a, FS: FileSystem> {
    content: &'a ContentStore<FS>,
    media: &'a MediaStore<FS>,
    url_prefix: &'a str,
}

impl<'a, FS: FileSystem> Renderer<'a, FS> {
    /// Create a renderer over a content store and a media store
    pub fn new(content: &'a ContentStore<FS>, media: &'a MediaStore<FS>, url_prefix: &'a str) -> Self {
        Self {
            content,
            media,
            url_prefix,
        }
    }

    /// The whole document, ready for rendering.
    ///
    /// Fails only when the document itself cannot be read. An unreadable media
    /// directory degrades every image to `""`.
    pub fn renderable_content(&self) -> Result<ContentDocument> {
        let mut document = self.content.read()?;
        let listing = self.media.list().unwrap_or_else(|e| {
            warn!("Could not list media directory {:?}: {}", self.media.dir(), e);
            Vec::new()
        });
        resolve_image_refs(&mut document, &listing, self.url_prefix);
        Ok(document)
    }

    /// A single page, ready for rendering. `None` if the page does not exist.
    pub fn renderable_page(&self, page: &str) -> Result<Option<Page>> {
        let document = self.renderable_content()?;
        Ok(document.page(page).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;

    fn renderer_over(fs: &InMemoryFileSystem) -> (ContentStore<InMemoryFileSystem>, MediaStore<InMemoryFileSystem>) {
        (
            ContentStore::new(fs.clone(), "/site/content.json", "/media"),
            MediaStore::new(fs.clone(), "/site/media"),
        )
    }

    #[test]
    fn test_renders_servable_reference() {
        let fs = InMemoryFileSystem::new()
            .with_file(
                "/site/content.json",
                r#"{"home":{"section1":{"title":"Hi","image1":"pic"}}}"#,
            )
            .with_file("/site/media/pic.png", "png");
        let (content, media) = renderer_over(&fs);
        let doc = Renderer::new(&content, &media, "/media")
            .renderable_content()
            .unwrap();

        let expected = serde_json::json!({"home": {"section1": {"title": "Hi", "image1": "/media/pic.png"}}});
        assert_eq!(serde_json::to_value(&doc).unwrap(), expected);
    }

    #[test]
    fn test_missing_and_empty_images_degrade() {
        let fs = InMemoryFileSystem::new().with_file(
            "/site/content.json",
            r#"{"home":{"hero":{"image":"ghost","backgroundImage":"","title":"ghost"}}}"#,
        );
        let (content, media) = renderer_over(&fs);
        let doc = Renderer::new(&content, &media, "/media")
            .renderable_content()
            .unwrap();

        assert_eq!(doc.field("home", "hero", "image"), Some(""));
        assert_eq!(doc.field("home", "hero", "backgroundImage"), Some(""));
        assert_eq!(doc.field("home", "hero", "title"), Some("ghost"));
    }

    #[test]
    fn test_legacy_url_values_still_resolve() {
        let mut doc = ContentDocument::new();
        doc.set_field("about", "team", "image", "/media/team.jpg");
        let listing = vec!["team.webp".to_string()];
        resolve_image_refs(&mut doc, &listing, "/media/");
        assert_eq!(doc.field("about", "team", "image"), Some("/media/team.webp"));
    }

    #[test]
    fn test_renderable_page() {
        let fs = InMemoryFileSystem::new()
            .with_file("/site/content.json", r#"{"home":{"s":{"image":"a"}},"about":{}}"#)
            .with_file("/site/media/a.gif", "gif");
        let (content, media) = renderer_over(&fs);
        let renderer = Renderer::new(&content, &media, "/media");

        let home = renderer.renderable_page("home").unwrap().unwrap();
        assert_eq!(home["s"]["image"], "/media/a.gif");
        assert!(renderer.renderable_page("blog").unwrap().is_none());
    }
}
