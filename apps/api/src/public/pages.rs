use axum::{extract::State, response::Html};
use sqlx::PgPool;

use crate::cv::repository::{ensure_active_profile, load_active_profile, load_cv_source};
use crate::cv::{assemble, catalogue, CvDocument};
use crate::errors::AppError;
use crate::models::career::{AcademicProductRow, WorkProductRow};
use crate::models::garage::GarageItemRow;
use crate::render::{pages, render_cv_page, CvStyle};
use crate::state::AppState;

/// The active profile's CV with the admin flags applied.
pub(crate) async fn published_cv(pool: &PgPool) -> Result<CvDocument, AppError> {
    let profile = ensure_active_profile(pool).await?;
    let source = load_cv_source(pool, profile).await?;
    let sections = source.admin_sections();
    Ok(assemble(source, sections))
}

/// GET /
pub async fn handle_cv(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let doc = published_cv(&state.db).await?;
    Ok(Html(render_cv_page(&doc, CvStyle::Clean)))
}

/// GET /hacker-neon/
pub async fn handle_cv_hacker_neon(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let doc = published_cv(&state.db).await?;
    Ok(Html(render_cv_page(&doc, CvStyle::HackerNeon)))
}

/// GET /seleccionar-plantilla/
pub async fn handle_template_chooser(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let profile = ensure_active_profile(&state.db).await?;
    Ok(Html(pages::template_chooser(&profile)))
}

/// GET /selector-cv/
pub async fn handle_section_selector(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let doc = published_cv(&state.db).await?;
    let certificates = catalogue(&doc);
    Ok(Html(pages::section_selector(&doc, &certificates)))
}

/// GET /venta-garage/
pub async fn handle_garage_sale(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let Some(profile) = load_active_profile(&state.db).await? else {
        return Ok(Html(pages::garage_sale(None, &[])));
    };

    let items = sqlx::query_as::<_, GarageItemRow>(
        "SELECT * FROM garage_items WHERE profile_id = $1 AND visible ORDER BY name, id",
    )
    .bind(profile.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Html(pages::garage_sale(Some(&profile), &items)))
}

/// GET /todos-los-productos/
pub async fn handle_all_products(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let Some(profile) = load_active_profile(&state.db).await? else {
        return Ok(Html(pages::all_products(None, &[], &[])));
    };

    let academic = sqlx::query_as::<_, AcademicProductRow>(
        "SELECT * FROM academic_products WHERE profile_id = $1 AND visible ORDER BY name, id",
    )
    .bind(profile.id)
    .fetch_all(&state.db)
    .await?;

    let work = sqlx::query_as::<_, WorkProductRow>(
        "SELECT * FROM work_products WHERE profile_id = $1 AND visible \
         ORDER BY produced_on DESC NULLS LAST, id",
    )
    .bind(profile.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Html(pages::all_products(Some(&profile), &academic, &work)))
}
