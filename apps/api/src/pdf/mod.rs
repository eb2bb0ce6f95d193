//! PDF output: the CV templates, certificate pages and page-level merging.
//!
//! Documents are built directly with `lopdf` using the PDF standard fonts, so
//! nothing has to be installed on the host to render them.

pub mod builder;
pub mod bundle;
pub mod cv_template;
pub mod font_metrics;
pub mod merge;
pub mod raster;

use lopdf::{Document, Object};
use thiserror::Error;

pub use bundle::bundle_with_certificates;
pub use cv_template::{render_cv, CvImages, Template};
pub use raster::RasterImage;

/// A4 in points.
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;
/// 15 mm.
pub const MARGIN: f32 = 42.52;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF structure error: {0}")]
    Structure(#[from] lopdf::Error),

    #[error("image could not be decoded: {0}")]
    Image(#[from] ::image::ImageError),

    #[error("document has no pages")]
    NoPages,

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("failed to write PDF: {0}")]
    Write(String),

    #[error("PDF task failed: {0}")]
    Task(String),
}

pub(crate) fn real(value: f32) -> Object {
    Object::Real(value)
}

/// Reads an integer or real PDF number.
pub(crate) fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Serialises a document to bytes.
pub fn to_bytes(mut doc: Document) -> Result<Vec<u8>, PdfError> {
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(out)
}
