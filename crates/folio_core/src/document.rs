//! Content document model.
//!
//! A [`ContentDocument`] is a three-level tree: pages contain sections, sections
//! contain fields, every field value is a string (empty meaning "unset"). Key
//! order is preserved so rewriting the file keeps it diff-friendly.
//!
//! Image fields are recognized by key name alone (see [`is_image_field`]) and hold
//! bare base names once normalized (see [`to_base_name`]).

use std::fmt;

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{FolioError, Result};

/// Field key to value
pub type Section = IndexMap<String, String>;

/// Section key to section
pub type Page = IndexMap<String, Section>;

/// Whether `key` names an image field (contains `image`, case-insensitive).
pub fn is_image_field(key: &str) -> bool {
    key.to_lowercase().contains("image")
}

/// Reduces an image reference to a bare base name.
///
/// Serving references (`<url_prefix>/pic.png`) and file names (`pic.png`) both
/// become `pic`; anything already bare is returned unchanged. Any remaining
/// directory part is dropped so the result never contains `/`, `\` or `.`.
/// Everything from the first `.` on is dropped, so `my.photo.png` becomes `my`
/// (logged as a warning).
pub fn to_base_name(value: &str, url_prefix: &str) -> String {
    let value = value.trim();
    let prefix = url_prefix.trim_end_matches('/');
    let value = if prefix.is_empty() {
        value
    } else {
        value
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(value)
    };
    let file_name = value.rsplit(['/', '\\']).next().unwrap_or(value);
    match file_name.find('.') {
        Some(idx) => {
            if file_name[idx + 1..].contains('.') {
                warn!(
                    "Image reference {:?} has more than one '.'; keeping {:?} as its base name",
                    value,
                    &file_name[..idx]
                );
            }
            file_name[..idx].to_string()
        }
        None => file_name.to_string(),
    }
}

/// Location of a field inside the document, displayed as `page.section.field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath<'a> {
    /// Page key
    pub page: &'a str,
    /// Section key
    pub section: &'a str,
    /// Field key
    pub field: &'a str,
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.page, self.section, self.field)
    }
}

/// The whole content tree: page key to page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContentDocument {
    pages: IndexMap<String, Page>,
}

impl ContentDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from parsed JSON, checking that every level is an object.
    ///
    /// Scalar leaves are coerced to strings (`null` becomes `""`); nested objects
    /// or arrays below the field level are rejected as invalid structure.
    pub fn from_value(value: Value) -> Result<Self> {
        let root = match value {
            Value::Object(map) => map,
            other => {
                return Err(FolioError::InvalidStructure {
                    location: "<root>".to_string(),
                    reason: format!(
                        "root level must be an object, found {}",
                        json_type_name(&other)
                    ),
                });
            }
        };

        let mut pages = IndexMap::with_capacity(root.len());
        for (page_key, page_value) in root {
            let page_map = expect_object(page_value, &page_key, "page")?;
            let mut page = Page::with_capacity(page_map.len());
            for (section_key, section_value) in page_map {
                let location = format!("{page_key}.{section_key}");
                let section_map = expect_object(section_value, &location, "section")?;
                let mut section = Section::with_capacity(section_map.len());
                for (field_key, field_value) in section_map {
                    let text = coerce_field(field_value).ok_or_else(|| {
                        FolioError::InvalidStructure {
                            location: format!("{location}.{field_key}"),
                            reason: "field value must be a string".to_string(),
                        }
                    })?;
                    section.insert(field_key, text);
                }
                page.insert(section_key, section);
            }
            pages.insert(page_key, page);
        }

        Ok(Self { pages })
    }

    /// Serialize as pretty-printed JSON (2-space indentation)
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// All pages in document order
    pub fn pages(&self) -> &IndexMap<String, Page> {
        &self.pages
    }

    /// Look up a page
    pub fn page(&self, page: &str) -> Option<&Page> {
        self.pages.get(page)
    }

    /// Look up a section
    pub fn section(&self, page: &str, section: &str) -> Option<&Section> {
        self.pages.get(page)?.get(section)
    }

    /// Look up a single field value
    pub fn field(&self, page: &str, section: &str, field: &str) -> Option<&str> {
        self.section(page, section)?.get(field).map(String::as_str)
    }

    /// Set a field, creating the page and section if they do not exist yet
    pub fn set_field(
        &mut self,
        page: &str,
        section: &str,
        field: &str,
        value: impl Into<String>,
    ) {
        self.pages
            .entry(page.to_string())
            .or_default()
            .entry(section.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
    }

    /// Visit every image field in document order
    pub fn for_each_image_field(&self, mut f: impl FnMut(FieldPath<'_>, &str)) {
        for (page_key, page) in &self.pages {
            for (section_key, section) in page {
                for (field_key, value) in section {
                    if is_image_field(field_key) {
                        let path = FieldPath {
                            page: page_key,
                            section: section_key,
                            field: field_key,
                        };
                        f(path, value);
                    }
                }
            }
        }
    }

    /// Visit every image field mutably in document order
    pub fn for_each_image_field_mut(&mut self, mut f: impl FnMut(FieldPath<'_>, &mut String)) {
        for (page_key, page) in self.pages.iter_mut() {
            for (section_key, section) in page.iter_mut() {
                for (field_key, value) in section.iter_mut() {
                    if is_image_field(field_key) {
                        let path = FieldPath {
                            page: page_key,
                            section: section_key,
                            field: field_key,
                        };
                        f(path, value);
                    }
                }
            }
        }
    }

    /// Rewrite every image reference to a bare base name.
    pub fn normalize_image_refs(&mut self, url_prefix: &str) {
        self.for_each_image_field_mut(|_, value| {
            let base = to_base_name(value, url_prefix);
            if *value != base {
                *value = base;
            }
        });
    }

    /// Rewrite every image field holding `old` to `new`, across all pages.
    /// Returns the number of fields changed.
    pub fn replace_base_name(&mut self, old: &str, new: &str) -> usize {
        let mut changed = 0;
        if old.is_empty() {
            return changed;
        }
        self.for_each_image_field_mut(|_, value| {
            if value == old {
                *value = new.to_string();
                changed += 1;
            }
        });
        changed
    }

    /// Number of image fields referencing `base_name`
    pub fn references(&self, base_name: &str) -> usize {
        let mut count = 0;
        self.for_each_image_field(|_, value| {
            if value == base_name {
                count += 1;
            }
        });
        count
    }
}

fn expect_object(value: Value, location: &str, level: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(FolioError::InvalidStructure {
            location: location.to_string(),
            reason: format!(
                "{level} must be an object, found {}",
                json_type_name(&other)
            ),
        }),
    }
}

fn coerce_field(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
