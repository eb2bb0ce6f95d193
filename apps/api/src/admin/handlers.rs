use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::auth::AdminSession;
use super::repository;
use super::resources::Resource;
use super::uploads::{read_file_field, store, UploadPolicy};
use crate::cv::repository::load_active_profile;
use crate::cv::visibility::{initialize_visibility, load_visibility, save_visibility, InitializeReport};
use crate::cv::{CertificateKind, SectionSet};
use crate::errors::AppError;
use crate::pdf::Template;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// CRUD, shared by every resource
// ────────────────────────────────────────────────────────────────────────────

/// GET /admin/api/<resource>
pub async fn handle_list<R: Resource>(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<R::Row>>, AppError> {
    Ok(Json(repository::list::<R>(&state.db).await?))
}

/// GET /admin/api/<resource>/:id
pub async fn handle_get<R: Resource>(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<R::Row>, AppError> {
    Ok(Json(repository::get::<R>(&state.db, id).await?))
}

/// POST /admin/api/<resource>
pub async fn handle_create<R: Resource>(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(mut payload): Json<R>,
) -> Result<(StatusCode, Json<R::Row>), AppError> {
    fill_default_profile(&state, &mut payload).await?;
    payload.validate(Utc::now().date_naive())?;
    let row = repository::insert(&state.db, &payload).await?;
    info!("{} created by {}", R::NAME, admin.username);
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /admin/api/<resource>/:id
pub async fn handle_update<R: Resource>(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<R>,
) -> Result<Json<R::Row>, AppError> {
    fill_default_profile(&state, &mut payload).await?;
    payload.validate(Utc::now().date_naive())?;
    let row = repository::update(&state.db, id, &payload).await?;
    info!("{} {id} updated by {}", R::NAME, admin.username);
    Ok(Json(row))
}

/// DELETE /admin/api/<resource>/:id
pub async fn handle_delete<R: Resource>(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    repository::delete::<R>(&state.db, id).await?;
    info!("{} {id} deleted by {}", R::NAME, admin.username);
    Ok(StatusCode::NO_CONTENT)
}

async fn fill_default_profile<R: Resource>(state: &AppState, payload: &mut R) -> Result<(), AppError> {
    if payload.needs_default_profile() {
        if let Some(profile) = load_active_profile(&state.db).await? {
            payload.assign_default_profile(profile.id);
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Section visibility
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    pub profile_id: i32,
    /// False when no record is stored and the defaults apply.
    pub stored: bool,
    pub sections: SectionSet,
}

/// GET /admin/api/profiles/:id/visibility
pub async fn handle_get_visibility(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(profile_id): Path<i32>,
) -> Result<Json<VisibilityResponse>, AppError> {
    ensure_profile(&state, profile_id).await?;
    let row = load_visibility(&state.db, profile_id).await?;
    Ok(Json(VisibilityResponse {
        profile_id,
        stored: row.is_some(),
        sections: SectionSet::from_admin(row.as_ref()),
    }))
}

/// PUT /admin/api/profiles/:id/visibility
pub async fn handle_put_visibility(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(profile_id): Path<i32>,
    Json(sections): Json<SectionSet>,
) -> Result<Json<VisibilityResponse>, AppError> {
    ensure_profile(&state, profile_id).await?;
    let row = save_visibility(&state.db, profile_id, sections).await?;
    info!("Visibility of profile {profile_id} updated by {}", admin.username);
    Ok(Json(VisibilityResponse {
        profile_id,
        stored: true,
        sections: SectionSet::from_admin(Some(&row)),
    }))
}

/// POST /admin/api/visibility/initialize
pub async fn handle_initialize_visibility(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<InitializeReport>, AppError> {
    Ok(Json(initialize_visibility(&state.db).await?))
}

async fn ensure_profile(state: &AppState, profile_id: i32) -> Result<(), AppError> {
    if repository::exists(&state.db, "profiles", profile_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Profile {profile_id} not found")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Uploads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: i32,
    pub url: String,
}

/// Checks the record, stores the file, then saves its URL on the record.
async fn upload_to_record(
    state: &AppState,
    table: &str,
    column: &str,
    id: i32,
    policy: &UploadPolicy,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    if !repository::exists(&state.db, table, id).await? {
        return Err(AppError::NotFound(format!("{table} {id} not found")));
    }
    let file = read_file_field(multipart).await?;
    let url = store(state.blobs.as_ref(), policy, file).await?;
    if !repository::set_url(&state.db, table, column, id, &url).await? {
        return Err(AppError::NotFound(format!("{table} {id} not found")));
    }
    Ok(Json(UploadResponse { id, url }))
}

async fn upload_certificate(
    state: &AppState,
    kind: CertificateKind,
    id: i32,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    upload_to_record(state, kind.table(), "certificate_url", id, &UploadPolicy::CERTIFICATE, multipart).await
}

/// POST /admin/api/experiences/:id/certificate
pub async fn handle_upload_experience_certificate(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    upload_certificate(&state, CertificateKind::Experience, id, multipart).await
}

/// POST /admin/api/courses/:id/certificate
pub async fn handle_upload_course_certificate(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    upload_certificate(&state, CertificateKind::Course, id, multipart).await
}

/// POST /admin/api/recognitions/:id/certificate
pub async fn handle_upload_recognition_certificate(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    upload_certificate(&state, CertificateKind::Recognition, id, multipart).await
}

/// POST /admin/api/profiles/:id/photo
pub async fn handle_upload_photo(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    upload_to_record(&state, "profiles", "photo_url", id, &UploadPolicy::PROFILE_PHOTO, multipart).await
}

/// POST /admin/api/profiles/:id/background/:template
pub async fn handle_upload_background(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((id, template)): Path<(i32, String)>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let column = match template.as_str() {
        "professional" => "background_professional_url",
        "modern" => "background_modern_url",
        other => {
            return Err(AppError::Validation(format!(
                "template must be '{}' or '{}', got '{other}'",
                Template::Professional.name(),
                Template::Modern.name()
            )))
        }
    };
    upload_to_record(&state, "profiles", column, id, &UploadPolicy::TEMPLATE_BACKGROUND, multipart).await
}

/// POST /admin/api/garage-items/:id/image
pub async fn handle_upload_item_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    upload_to_record(&state, "garage_items", "image_url", id, &UploadPolicy::GARAGE_IMAGE, multipart).await
}
