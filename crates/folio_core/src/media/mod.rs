//! Media directory handling.
//!
//! The media directory is a single flat folder of image files named
//! `<base><ext>`, `<base>_v<N><ext>` or, for superseded files awaiting cleanup,
//! `prev-<base><ext>`.
//!
//! - [`path`]: the only place that turns a file name into a path inside the media directory
//! - [`MediaStore`]: primitive file operations (exists, delete, rename, write, list)
//! - [`naming`]: base name to file resolution, version allocation, upload name sanitizing
//! - [`ImageType`]: the accepted upload media types

mod image_type;
pub mod naming;
pub mod path;
mod store;

pub use image_type::ImageType;
pub use store::MediaStore;
