use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::state::{ApiError, AppState};

/// GET /api/media/{*filename} - Serve a media file with long-lived caching
pub async fn serve_media(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let name = filename.clone();
    let bytes = state
        .with_site(move |site| {
            let media = site.media_store();
            // Validates the name before the existence check.
            media.resolve(&name)?;
            if !media.exists(&name) {
                return Ok(None);
            }
            media.read(&name).map(Some)
        })
        .await?;

    let Some(bytes) = bytes else {
        debug!("Media file not found: {}", filename);
        return Err(ApiError::NotFound(format!("File not found: {filename}")));
    };

    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();
    let headers = [
        (header::CONTENT_TYPE, content_type),
        (
            header::CACHE_CONTROL,
            "public, max-age=31536000, immutable".to_string(),
        ),
    ];
    Ok((headers, bytes).into_response())
}
