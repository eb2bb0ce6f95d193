//! Blob storage access. Records in the database only hold URLs; every image or
//! certificate the site serves goes through a [`BlobStore`].

#[cfg(test)]
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use s3::S3BlobStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid blob URL: {0}")]
    InvalidUrl(String),

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("HTTP fetch failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A downloaded blob.
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub bytes: Bytes,
    pub filename: String,
}

/// Bucket and object key addressed by a path-style blob URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Downloads the blob a stored URL points at.
    async fn fetch(&self, url: &str) -> Result<BlobObject, StorageError>;

    /// Stores `bytes` under `key` and returns the URL to save on the record.
    async fn upload(&self, key: &str, bytes: Bytes, content_type: &str)
        -> Result<String, StorageError>;
}

/// Splits `https://<host>/<bucket>/<key...>` into bucket and key.
pub fn parse_blob_url(url: &str) -> Result<BlobLocation, StorageError> {
    let parsed =
        reqwest::Url::parse(url).map_err(|e| StorageError::InvalidUrl(format!("{url}: {e}")))?;
    let path = parsed.path().trim_start_matches('/');
    match path.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(BlobLocation {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }),
        _ => Err(StorageError::InvalidUrl(url.to_string())),
    }
}

/// Last path segment of an object key or URL path.
pub fn blob_filename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Guesses a MIME type from a file name extension.
pub fn content_type_for(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// True when the file name has one of the image extensions certificates may use.
pub fn is_image_filename(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg", ".gif", ".webp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Builds an object key under `prefix` that keeps a readable file name.
pub fn object_key(prefix: &str, filename: &str) -> String {
    let cleaned: String = blob_filename(filename)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}/{}-{}", prefix, uuid::Uuid::new_v4(), cleaned)
}
