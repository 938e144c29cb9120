use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use folio_core::document::{ContentDocument, Page};
use folio_core::error::FolioError;
use folio_core::update::{FormFile, SectionUpdate, UpdateOutcome};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::state::{ApiError, AppState};

/// Multipart part carrying the JSON object of field values
pub const SECTION_DATA_PART: &str = "sectionDataJson";
/// Multipart part carrying one image file (repeatable)
pub const IMAGE_FILE_PART: &str = "imageFile";
/// Multipart part naming the field of the matching image file (repeatable)
pub const IMAGE_FIELD_KEY_PART: &str = "imageFieldKey";

/// Decoded admin update form
#[derive(Debug, Default)]
pub struct UpdateForm {
    pub section_data_json: Option<String>,
    pub files: Vec<FormFile>,
    pub field_keys: Vec<String>,
}

/// Revalidation response
#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    pub revalidated: bool,
}

/// Renderable document, from the cache when warm
async fn cached_content(state: &AppState) -> Result<ContentDocument, ApiError> {
    if let Some(document) = state.cache.get() {
        return Ok(document);
    }
    let generation = state.cache.generation();
    let document = state.with_site(|site| site.renderable_content()).await?;
    state.cache.put(document.clone(), generation);
    Ok(document)
}

/// GET /api/content - Whole document with servable image URLs
pub async fn get_content(State(state): State<AppState>) -> Result<Json<ContentDocument>, ApiError> {
    Ok(Json(cached_content(&state).await?))
}

/// GET /api/content/{page} - One page with servable image URLs
pub async fn get_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<Page>, ApiError> {
    let document = cached_content(&state).await?;
    match document.page(&page) {
        Some(content) => Ok(Json(content.clone())),
        None => Err(ApiError::NotFound(format!("Page '{page}' not found"))),
    }
}

/// GET /api/admin/content - Stored document with bare base names
pub async fn get_admin_content(
    State(state): State<AppState>,
) -> Result<Json<ContentDocument>, ApiError> {
    let document = state.with_site(|site| site.admin_content()).await?;
    Ok(Json(document))
}

/// POST /api/revalidate - Drop the render cache
pub async fn revalidate(State(state): State<AppState>) -> Json<RevalidateResponse> {
    state.cache.clear();
    info!("Render cache cleared on request");
    Json(RevalidateResponse { revalidated: true })
}

/// POST /api/admin/sections/{page}/{section} - Apply an admin form submission
pub async fn update_section(
    State(state): State<AppState>,
    Path((page, section)): Path<(String, String)>,
    multipart: Multipart,
) -> Response {
    match parse_multipart(multipart).await {
        Ok(form) => run_update(&state, page, section, form).await,
        Err(e) => outcome_response(&page, &section, Err(e)),
    }
}

/// Collect the update form's parts. Unknown parts are ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UpdateForm, FolioError> {
    let mut form = UpdateForm::default();
    let malformed = |e: axum::extract::multipart::MultipartError| {
        FolioError::MalformedRequest(format!("invalid multipart body ({e})"))
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            SECTION_DATA_PART => {
                form.section_data_json = Some(field.text().await.map_err(malformed)?);
            }
            IMAGE_FILE_PART => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let media_type = field
                    .content_type()
                    .map(String::from)
                    .or_else(|| mime_guess::from_path(&file_name).first().map(|m| m.to_string()))
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await.map_err(malformed)?;
                form.files.push(FormFile {
                    file_name,
                    media_type,
                    bytes: bytes.to_vec(),
                });
            }
            IMAGE_FIELD_KEY_PART => {
                form.field_keys.push(field.text().await.map_err(malformed)?);
            }
            other => debug!("Ignoring multipart part {:?}", other),
        }
    }
    Ok(form)
}

/// Build the update from a decoded form and run it.
pub async fn run_update(state: &AppState, page: String, section: String, form: UpdateForm) -> Response {
    let Some(section_data_json) = form.section_data_json else {
        return outcome_response(
            &page,
            &section,
            Err(FolioError::MalformedRequest(format!(
                "missing '{SECTION_DATA_PART}' part"
            ))),
        );
    };

    let update = match SectionUpdate::from_form(
        page.as_str(),
        section.as_str(),
        &section_data_json,
        form.files,
        form.field_keys,
    ) {
        Ok(update) => update,
        Err(e) => return outcome_response(&page, &section, Err(e)),
    };

    let result = state
        .with_site(move |site| site.update_section(&update))
        .await;
    match result {
        Ok(updated) => outcome_response(&page, &section, Ok(updated)),
        Err(ApiError::Folio(e)) => outcome_response(&page, &section, Err(e)),
        Err(other) => other.into_response(),
    }
}

fn outcome_response(
    page: &str,
    section: &str,
    result: folio_core::error::Result<folio_core::document::Section>,
) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) if e.is_validation() => StatusCode::BAD_REQUEST,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if let Err(e) = &result {
        warn!("Update of {}/{} failed: {}", page, section, e);
    }
    let outcome = UpdateOutcome::from_result(page, section, result);
    (status, Json(outcome)).into_response()
}
