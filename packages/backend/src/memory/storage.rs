use std::collections::HashMap;

use async_trait::async_trait;

use super::{lock, MemoryBackend};
use crate::error::BackendError;
use crate::models::{ObjectPath, UploadProgress};
use crate::service::ObjectStorage;

#[derive(Default)]
pub(super) struct StorageState {
    objects: HashMap<ObjectPath, Vec<u8>>,
    /// Reason the next upload fails with, if armed.
    fail_next_upload: Option<String>,
}

impl MemoryBackend {
    /// Bytes stored at `path`.
    pub fn stored_object(&self, path: &ObjectPath) -> Option<Vec<u8>> {
        lock(&self.inner.storage).objects.get(path).cloned()
    }

    pub fn object_count(&self) -> usize {
        lock(&self.inner.storage).objects.len()
    }

    /// Make the next upload fail with `reason`.
    pub fn fail_next_upload(&self, reason: impl Into<String>) {
        lock(&self.inner.storage).fail_next_upload = Some(reason.into());
    }

    fn download_url(&self, path: &ObjectPath) -> String {
        let storage = &self.inner.config.storage;
        format!(
            "{}/v0/b/{}/o/{}?alt=media",
            storage.base_url.trim_end_matches('/'),
            storage.bucket,
            urlencoding::encode(path.as_str())
        )
    }
}

#[async_trait]
impl ObjectStorage for MemoryBackend {
    async fn upload_file(
        &self,
        path: &ObjectPath,
        bytes: Vec<u8>,
        on_progress: &(dyn Fn(UploadProgress) + Send + Sync),
    ) -> Result<(), BackendError> {
        let total_bytes = bytes.len() as u64;
        let chunk_size = self.inner.config.storage.upload_chunk_bytes.max(1);

        let mut progress = UploadProgress {
            bytes_transferred: 0,
            total_bytes,
        };
        on_progress(progress);

        let failure = lock(&self.inner.storage).fail_next_upload.take();
        if let Some(reason) = failure {
            tracing::warn!(path = %path, %reason, "upload failed");
            return Err(BackendError::UploadFailed {
                path: path.to_string(),
                reason,
            });
        }

        for chunk in bytes.chunks(chunk_size) {
            progress.bytes_transferred += chunk.len() as u64;
            on_progress(progress);
        }

        lock(&self.inner.storage).objects.insert(path.clone(), bytes);
        tracing::debug!(path = %path, total_bytes, "upload complete");
        Ok(())
    }

    async fn get_public_url(&self, path: &ObjectPath) -> Result<String, BackendError> {
        if !lock(&self.inner.storage).objects.contains_key(path) {
            return Err(BackendError::ObjectNotFound(path.to_string()));
        }
        Ok(self.download_url(path))
    }
}
