//! Storage module for uploaded documents
//!
//! Uploaded files are treated as opaque blobs addressed by a reference string.
//! Two backends implement [`BlobStore`]: a local directory served statically
//! (default) and a MinIO/S3-compatible bucket.

mod local;
mod minio_client;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::core::error::AppError;

pub use local::LocalDiskStore;
pub use minio_client::MinIOClient;

/// Persists uploaded files and hands back an addressable reference
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the bytes and return a reference unique to this call
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
    ) -> Result<String, AppError>;

    /// Remove a previously stored blob. Unknown references are not an error.
    async fn delete(&self, blob_ref: &str) -> Result<(), AppError>;
}

/// Generate a blob name of the form `{unix_millis}-{random hex}{.ext}`,
/// keeping the extension of the original filename.
pub fn generate_blob_name(original_filename: &str) -> String {
    let token = hex::encode(rand::random::<[u8; 6]>());
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}-{}{}", Utc::now().timestamp_millis(), token, extension)
}

/// Delete blobs in a detached task. Failures are logged and never reach the caller.
pub fn release_blobs(store: Arc<dyn BlobStore>, blob_refs: Vec<String>) {
    if blob_refs.is_empty() {
        return;
    }

    tokio::spawn(async move {
        for blob_ref in blob_refs {
            match store.delete(&blob_ref).await {
                Ok(()) => tracing::debug!("Released blob {}", blob_ref),
                Err(e) => tracing::warn!("Failed to delete blob {}: {}", blob_ref, e),
            }
        }
    });
}
