use axum::{
    extract::{Query, State},
    response::Response,
};
use tracing::{info, warn};

use super::pages::published_cv;
use super::responses::pdf_attachment;
use crate::cv::repository::{ensure_active_profile, load_cv_source};
use crate::cv::{
    assemble, catalogue, stored_certificates, CertificateEntry, CertificateSelection, CvDocument,
    SectionSet,
};
use crate::errors::AppError;
use crate::models::profile::{non_empty, ProfileRow};
use crate::pdf::{bundle_with_certificates, render_cv, to_bytes, CvImages, RasterImage, Template};
use crate::state::AppState;
use crate::storage::BlobStore;

type QueryPairs = Query<Vec<(String, String)>>;

fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// GET /descargar-cv/?plantilla=
/// The chosen template followed by every certificate stored for the profile,
/// whether or not its record is published.
pub async fn handle_download_cv(
    State(state): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Response, AppError> {
    let template = Template::from_param(query_value(&params, "plantilla"));
    let profile = ensure_active_profile(&state.db).await?;
    let source = load_cv_source(&state.db, profile).await?;
    let certificates = stored_certificates(&source);
    let sections = source.admin_sections();
    let doc = assemble(source, sections);

    let (bytes, merged) = cv_with_certificates(state.blobs.as_ref(), doc, template, &certificates).await?;
    let filename = if merged {
        format!("cv_{}_completo.pdf", template.name())
    } else {
        format!("cv_{}.pdf", template.name())
    };
    Ok(pdf_attachment(&filename, bytes))
}

/// GET /descargar-cv-completo/?certificados=&check_all=
pub async fn handle_download_complete(
    State(state): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Response, AppError> {
    let doc = published_cv(&state.db).await?;
    let certificates = CertificateSelection::from_query(&params).apply(catalogue(&doc));
    info!("Complete CV requested with {} certificates", certificates.len());

    let (bytes, _) =
        cv_with_certificates(state.blobs.as_ref(), doc, Template::Professional, &certificates).await?;
    Ok(pdf_attachment("cv_completo.pdf", bytes))
}

/// GET /descargar-cv-personalizado/?<sections>
pub async fn handle_download_custom(
    State(state): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Response, AppError> {
    let doc = selected_cv(&state, &params).await?;
    let bytes = to_bytes(render_pdf(state.blobs.as_ref(), doc, Template::Professional).await?)?;
    Ok(pdf_attachment("cv_personalizado.pdf", bytes))
}

/// GET /descargar-cv-personalizado-plantilla/?plantilla=&<sections>
pub async fn handle_download_custom_template(
    State(state): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Response, AppError> {
    let template = Template::from_param(query_value(&params, "plantilla"));
    let doc = selected_cv(&state, &params).await?;
    let bytes = to_bytes(render_pdf(state.blobs.as_ref(), doc, template).await?)?;
    Ok(pdf_attachment(
        &format!("cv_{}_personalizado.pdf", template.name()),
        bytes,
    ))
}

/// The sections the visitor ticked, limited to what the admin publishes.
async fn selected_cv(state: &AppState, params: &[(String, String)]) -> Result<CvDocument, AppError> {
    let profile = ensure_active_profile(&state.db).await?;
    let source = load_cv_source(&state.db, profile).await?;
    let sections = effective_sections(params, source.admin_sections());
    Ok(assemble(source, sections))
}

fn effective_sections(params: &[(String, String)], admin: SectionSet) -> SectionSet {
    SectionSet::from_query(params).intersect(&admin)
}

/// Renders the CV and appends `certificates`. When the merge fails as a whole
/// the CV is returned alone and the flag is false.
async fn cv_with_certificates(
    blobs: &dyn BlobStore,
    doc: CvDocument,
    template: Template,
    certificates: &[CertificateEntry],
) -> Result<(Vec<u8>, bool), AppError> {
    let cv = render_pdf(blobs, doc, template).await?;
    if certificates.is_empty() {
        return Ok((to_bytes(cv)?, true));
    }

    match bundle_with_certificates(cv.clone(), certificates, blobs).await {
        Ok(bytes) => Ok((bytes, true)),
        Err(e) => {
            warn!("Certificate merge failed, sending the CV alone: {e}");
            Ok((to_bytes(cv)?, false))
        }
    }
}

async fn render_pdf(
    blobs: &dyn BlobStore,
    doc: CvDocument,
    template: Template,
) -> Result<lopdf::Document, AppError> {
    let images = load_cv_images(blobs, &doc.profile, template).await;
    let rendered = tokio::task::spawn_blocking(move || render_cv(&doc, template, images))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF render task failed: {e}")))??;
    Ok(rendered)
}

async fn load_cv_images(blobs: &dyn BlobStore, profile: &ProfileRow, template: Template) -> CvImages {
    let background_url = match template {
        Template::Professional => profile.background_professional_url.as_deref(),
        Template::Modern => profile.background_modern_url.as_deref(),
    };
    CvImages {
        photo: fetch_image(blobs, profile.photo_url.as_deref(), "profile photo").await,
        background: fetch_image(blobs, background_url, "template background").await,
    }
}

/// A missing or unreadable image leaves its slot empty.
async fn fetch_image(blobs: &dyn BlobStore, url: Option<&str>, what: &str) -> Option<RasterImage> {
    let url = non_empty(url)?;
    let blob = match blobs.fetch(url).await {
        Ok(blob) => blob,
        Err(e) => {
            warn!("Could not download {what}: {e}");
            return None;
        }
    };
    match RasterImage::decode(&blob.bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("Could not decode {what} {}: {e}", blob.filename);
            None
        }
    }
}
