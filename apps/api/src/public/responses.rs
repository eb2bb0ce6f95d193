use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use crate::storage::{content_type_for, BlobObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    /// `download=1|true|True|yes` asks for an attachment.
    pub fn from_query(params: &[(String, String)]) -> Self {
        let download = params
            .iter()
            .find(|(key, _)| key == "download")
            .is_some_and(|(_, value)| matches!(value.as_str(), "1" | "true" | "True" | "yes"));
        if download {
            Disposition::Attachment
        } else {
            Disposition::Inline
        }
    }

    fn header_value(&self, filename: &str) -> String {
        let kind = match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        };
        // Quotes would end the parameter early.
        format!("{kind}; filename=\"{}\"", filename.replace('"', ""))
    }
}

/// A generated PDF offered as a download.
pub fn pdf_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                Disposition::Attachment.header_value(filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// A stored certificate, always served as PDF.
pub fn certificate_response(blob: BlobObject, disposition: Disposition) -> Response {
    blob_response(blob, "application/pdf", disposition)
}

/// A stored image. The type comes from the file name, PNG when it says nothing.
pub fn image_response(blob: BlobObject, disposition: Disposition) -> Response {
    let content_type = content_type_for(&blob.filename).unwrap_or("image/png");
    blob_response(blob, content_type, disposition)
}

fn blob_response(blob: BlobObject, content_type: &str, disposition: Disposition) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                disposition.header_value(&blob.filename),
            ),
        ],
        blob.bytes,
    )
        .into_response()
}
