use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, info, warn};

use super::{blob_filename, parse_blob_url, BlobLocation, BlobObject, BlobStore, StorageError};
use crate::config::Config;

/// Blob store backed by an S3-compatible service (MinIO locally, AWS in production).
///
/// Reads go through the SDK first. If that fails the URL is fetched over plain
/// HTTP, which covers public objects and pre-signed URLs saved by hand.
#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    http: reqwest::Client,
    bucket: String,
    endpoint: String,
}

impl S3BlobStore {
    /// Constructs the S3 client from configuration. Uses path-style addressing so
    /// stored URLs look like `<endpoint>/<bucket>/<key>`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "hojavida-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        info!(bucket = %config.s3_bucket, "S3 blob store configured");

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            http,
            bucket: config.s3_bucket.clone(),
            endpoint: config.s3_endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_from_s3(&self, location: &BlobLocation) -> Result<BlobObject, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_no_such_key() => StorageError::NotFound(location.key.clone()),
                _ => StorageError::Backend(format!("get_object {}: {e}", location.key)),
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("reading {}: {e}", location.key)))?
            .into_bytes();

        let filename = blob_filename(&location.key).to_string();
        debug!(key = %location.key, size = bytes.len(), "Fetched blob from S3");

        Ok(BlobObject { bytes, filename })
    }

    async fn fetch_over_http(&self, url: &str) -> Result<BlobObject, StorageError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let filename = response
            .url()
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("blob")
            .to_string();
        let bytes = response.bytes().await?;

        Ok(BlobObject { bytes, filename })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn fetch(&self, url: &str) -> Result<BlobObject, StorageError> {
        let s3_error = match parse_blob_url(url) {
            Ok(location) => match self.fetch_from_s3(&location).await {
                Ok(blob) => return Ok(blob),
                Err(e) => e,
            },
            Err(e) => e,
        };

        warn!("S3 read failed for {url} ({s3_error}); falling back to HTTP");
        match self.fetch_over_http(url).await {
            Ok(blob) => Ok(blob),
            Err(http_error) => {
                warn!("HTTP fallback failed for {url}: {http_error}");
                Err(s3_error)
            }
        }
    }

    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("put_object {key}: {e}")))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(format!("{}/{}/{}", self.endpoint, self.bucket, key))
    }
}
