use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use folio_core::error::FolioError;
use folio_core::fs::RealFileSystem;
use folio_core::site::Site;
use tracing::error;

use crate::cache::RenderCache;

/// The site type served by this crate
pub type ServerSite = Site<RealFileSystem>;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<ServerSite>,
    pub cache: Arc<RenderCache>,
}

impl AppState {
    /// Wire the render cache into the site as its invalidator
    pub fn new(site: ServerSite) -> Self {
        let cache = Arc::new(RenderCache::new());
        let site = site.with_invalidator(cache.clone());
        Self {
            site: Arc::new(site),
            cache,
        }
    }

    /// Run a blocking site call off the async runtime
    pub async fn with_site<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&ServerSite) -> folio_core::error::Result<T> + Send + 'static,
    {
        let site = self.site.clone();
        tokio::task::spawn_blocking(move || f(&site))
            .await
            .map_err(|e| ApiError::Internal(format!("site task failed: {e}")))?
            .map_err(ApiError::Folio)
    }
}

/// Error returned by handlers
#[derive(Debug)]
pub enum ApiError {
    Folio(FolioError),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Folio(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Folio(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<FolioError> for ApiError {
    fn from(err: FolioError) -> Self {
        ApiError::Folio(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Folio(e) => {
                if status.is_server_error() {
                    error!("Request failed: {}", e);
                }
                e.to_serializable()
            }
            ApiError::NotFound(message) => folio_core::error::SerializableError {
                kind: "NotFound".to_string(),
                message,
            },
            ApiError::Internal(message) => {
                error!("Internal error: {}", message);
                folio_core::error::SerializableError {
                    kind: "Internal".to_string(),
                    message,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
