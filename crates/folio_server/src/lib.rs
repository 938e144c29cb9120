//! Folio Server
//!
//! HTTP front end for a Folio site: serves media files, exposes the page
//! content for rendering and accepts admin section updates.
//!
//! ## Routes
//!
//! - `GET /api/media/{*filename}`: media file with long-lived cache headers
//! - `GET /api/content`, `GET /api/content/{page}`: content with servable image URLs
//! - `GET /api/admin/content`: stored content with bare image base names
//! - `POST /api/admin/sections/{page}/{section}`: multipart section update
//! - `POST /api/revalidate`: drop the render cache
//!
//! ## Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3040)
//! - `FOLIO_ROOT`: Site root directory (default: .)
//! - `FOLIO_CONFIG`: Site config file (default: `<FOLIO_ROOT>/folio.toml`)
//! - `CORS_ORIGINS`: Comma-separated list of allowed origins

pub mod cache;
pub mod config;
pub mod handlers;
pub mod state;

pub use config::Config;
pub use state::AppState;
