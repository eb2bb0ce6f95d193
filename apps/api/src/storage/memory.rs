use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{blob_filename, content_type_for, parse_blob_url, BlobObject, BlobStore, StorageError};

pub const TEST_BLOB_HOST: &str = "https://blobs.test";

/// In-process blob store used by tests in place of S3.
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object and returns the URL a record would hold.
    pub fn insert(&self, bucket_and_key: &str, bytes: impl Into<Bytes>) -> String {
        let url = format!("{TEST_BLOB_HOST}/{bucket_and_key}");
        let content_type = content_type_for(bucket_and_key)
            .unwrap_or("application/octet-stream")
            .to_string();
        self.objects
            .lock()
            .expect("blob map poisoned")
            .insert(url.clone(), (bytes.into(), content_type));
        url
    }

    /// Content type an object was stored with.
    pub fn content_type(&self, url: &str) -> Option<String> {
        self.objects
            .lock()
            .expect("blob map poisoned")
            .get(url)
            .map(|(_, content_type)| content_type.clone())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn fetch(&self, url: &str) -> Result<BlobObject, StorageError> {
        let location = parse_blob_url(url)?;
        let objects = self.objects.lock().expect("blob map poisoned");
        let bytes = objects
            .get(url)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StorageError::NotFound(location.key.clone()))?;
        Ok(BlobObject {
            bytes,
            filename: blob_filename(&location.key).to_string(),
        })
    }

    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{TEST_BLOB_HOST}/test-bucket/{key}");
        self.objects
            .lock()
            .expect("blob map poisoned")
            .insert(url.clone(), (bytes, content_type.to_string()));
        Ok(url)
    }
}
