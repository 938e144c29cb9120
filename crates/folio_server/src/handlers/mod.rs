pub mod content;
pub mod media;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Headroom on top of the largest upload for the other form parts
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create API routes
pub fn api_routes(state: AppState) -> Router {
    let upload_limit = usize::try_from(state.site.config().max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(4)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/media/{*filename}", get(media::serve_media))
        .route("/content", get(content::get_content))
        .route("/content/{page}", get(content::get_page))
        .route("/admin/content", get(content::get_admin_content))
        .route(
            "/admin/sections/{page}/{section}",
            post(content::update_section).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/revalidate", post(content::revalidate))
        .with_state(state)
}
