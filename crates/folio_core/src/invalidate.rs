//! Cache invalidation hook.
//!
//! After a successful section update the rendering layer is told which logical
//! paths are stale. What it does with that (drop a render cache, trigger a
//! static rebuild) is its own business; nothing is returned.

use std::sync::Arc;

/// Logical path of the admin screen, invalidated after every update
pub const ADMIN_PATH: &str = "/admin";

/// Receives "this path is stale" signals from the core.
pub trait CacheInvalidator: Send + Sync {
    /// Mark the rendered output for `path` as stale
    fn invalidate(&self, path: &str);
}

impl<T: CacheInvalidator + ?Sized> CacheInvalidator for Arc<T> {
    fn invalidate(&self, path: &str) {
        (**self).invalidate(path)
    }
}

/// Invalidator for callers without a cache (CLI, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn invalidate(&self, _path: &str) {}
}

/// Logical page path for a page key: `home` is the site root.
pub fn page_path(page_key: &str) -> String {
    if page_key == "home" {
        "/".to_string()
    } else {
        format!("/{page_key}")
    }
}
