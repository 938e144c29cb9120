#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Media directory audit (duplicate base names, missing images)
pub mod audit;

/// Configuration options
pub mod config;

/// Content document model
pub mod document;

/// Error (common error types)
pub mod error;

/// Filesystem abstraction
pub mod fs;

/// Cache invalidation signal for the rendering layer
pub mod invalidate;

/// Media directory (safe paths, file store, filename resolution)
pub mod media;

/// Content read/normalize for page rendering
pub mod render;

/// Site facade tying the stores together
pub mod site;

/// Content document persistence
pub mod store;

/// Section update transaction
pub mod update;

#[cfg(test)]
pub mod test_utils;
