//! File uploads for certificates, the profile photo, template backgrounds and
//! garage item pictures.

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::storage::{object_key, BlobStore};

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub prefix: &'static str,
    pub allowed_extensions: &'static [&'static str],
    /// Checked only when the client sends a content type.
    pub allowed_content_types: &'static [&'static str],
    pub max_bytes: Option<usize>,
}

impl UploadPolicy {
    pub const CERTIFICATE: UploadPolicy = UploadPolicy {
        prefix: "certificados",
        allowed_extensions: &["pdf"],
        allowed_content_types: &["application/pdf"],
        max_bytes: None,
    };

    pub const PROFILE_PHOTO: UploadPolicy = UploadPolicy {
        prefix: "perfil",
        allowed_extensions: &["png"],
        allowed_content_types: &["image/png"],
        max_bytes: None,
    };

    pub const TEMPLATE_BACKGROUND: UploadPolicy = UploadPolicy {
        prefix: "fondos",
        allowed_extensions: &["png", "jpg", "jpeg", "gif", "webp"],
        allowed_content_types: &["image/png", "image/jpeg", "image/gif", "image/webp"],
        max_bytes: None,
    };

    pub const GARAGE_IMAGE: UploadPolicy = UploadPolicy {
        prefix: "venta-garage",
        allowed_extensions: &["png", "jpg", "jpeg"],
        allowed_content_types: &["image/png", "image/jpeg", "image/jpg"],
        max_bytes: Some(10 * 1024 * 1024),
    };

    pub fn check(&self, file: &UploadedFile) -> Result<(), AppError> {
        let extension = file
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !self.allowed_extensions.contains(&extension.as_str()) {
            return Err(AppError::Validation(format!(
                "file must have one of these extensions: {}",
                self.allowed_extensions.join(", ")
            )));
        }

        if let Some(content_type) = file.content_type.as_deref() {
            if !self.allowed_content_types.contains(&content_type) {
                return Err(AppError::Validation(format!(
                    "content type {content_type} is not accepted"
                )));
            }
        }

        if let Some(max) = self.max_bytes {
            if file.bytes.len() > max {
                return Err(AppError::Validation(format!(
                    "file is larger than {} MB",
                    max / (1024 * 1024)
                )));
            }
        }

        if file.bytes.is_empty() {
            return Err(AppError::Validation("file is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Reads the `file` field of a multipart body.
pub async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("file field has no file name".to_string()))?;
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }
    Err(AppError::Validation("multipart field 'file' is missing".to_string()))
}

/// Checks the file against `policy`, stores it and returns its URL.
pub async fn store(
    blobs: &dyn BlobStore,
    policy: &UploadPolicy,
    file: UploadedFile,
) -> Result<String, AppError> {
    policy.check(&file)?;

    let key = object_key(policy.prefix, &file.filename);
    let content_type = file
        .content_type
        .as_deref()
        .or_else(|| crate::storage::content_type_for(&file.filename))
        .unwrap_or("application/octet-stream")
        .to_string();
    let size = file.bytes.len();
    let url = blobs.upload(&key, file.bytes, &content_type).await?;

    info!("Stored upload {key} ({size} bytes)");
    Ok(url)
}
