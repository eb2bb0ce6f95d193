//! Blob proxies. Visitors never see a storage URL; these handlers look the
//! URL up on the record and stream the object back.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};

use super::responses::{certificate_response, image_response, Disposition};
use crate::cv::repository::{ensure_active_profile, load_active_profile};
use crate::cv::CertificateKind;
use crate::errors::AppError;
use crate::models::profile::non_empty;
use crate::pdf::Template;
use crate::state::AppState;

/// GET /certificados/:kind/:id/
pub async fn handle_certificate(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i32)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let kind = CertificateKind::from_token_prefix(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown certificate kind '{kind}'")))?;

    let sql = format!("SELECT certificate_url FROM {} WHERE id = $1", kind.table());
    let url = sqlx::query_scalar::<_, Option<String>>(&sql)
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    let url = url
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", kind.token_prefix())))?;
    let url = non_empty(url.as_deref())
        .ok_or_else(|| AppError::NotFound(format!("{} {id} has no certificate", kind.token_prefix())))?;

    let blob = state.blobs.fetch(url).await?;
    Ok(certificate_response(blob, Disposition::from_query(&params)))
}

/// GET /producto/:id/imagen/
pub async fn handle_item_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    item_image(&state, id, Disposition::Inline).await
}

/// GET /producto/:id/descargar-imagen/
pub async fn handle_item_image_download(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    item_image(&state, id, Disposition::Attachment).await
}

async fn item_image(state: &AppState, id: i32, disposition: Disposition) -> Result<Response, AppError> {
    let row = sqlx::query_as::<_, (Option<String>, bool)>(
        "SELECT image_url, visible FROM garage_items WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    let (image_url, visible) =
        row.ok_or_else(|| AppError::NotFound(format!("Item {id} not found")))?;
    let url = non_empty(image_url.as_deref())
        .ok_or_else(|| AppError::NotFound(format!("Item {id} has no image")))?;
    if !visible {
        return Err(AppError::NotFound(format!("Item {id} is not available")));
    }

    let blob = state.blobs.fetch(url).await?;
    Ok(image_response(blob, disposition))
}

/// GET /foto-perfil/
pub async fn handle_profile_photo(State(state): State<AppState>) -> Result<Response, AppError> {
    let profile = ensure_active_profile(&state.db).await?;
    let url = non_empty(profile.photo_url.as_deref())
        .ok_or_else(|| AppError::NotFound("No profile photo available".to_string()))?;
    let blob = state.blobs.fetch(url).await?;
    Ok(image_response(blob, Disposition::Inline))
}

/// GET /fondo-professional/
pub async fn handle_background_professional(
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    template_background(&state, Template::Professional).await
}

/// GET /fondo-modern/
pub async fn handle_background_modern(State(state): State<AppState>) -> Result<Response, AppError> {
    template_background(&state, Template::Modern).await
}

async fn template_background(state: &AppState, template: Template) -> Result<Response, AppError> {
    let profile = load_active_profile(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No profile found".to_string()))?;
    let url = match template {
        Template::Professional => profile.background_professional_url.as_deref(),
        Template::Modern => profile.background_modern_url.as_deref(),
    };
    let url = non_empty(url).ok_or_else(|| {
        AppError::NotFound(format!("No {} background uploaded", template.name()))
    })?;
    let blob = state.blobs.fetch(url).await?;
    Ok(image_response(blob, Disposition::Inline))
}
