//! Local directory blob store
//!
//! Files are written to `upload_dir` and served by `ServeDir` under the
//! configured public path, so a reference is directly fetchable
//! (e.g. `/uploads/1718000000000-3fa2c1d09e44.pdf`).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{generate_blob_name, BlobStore};
use crate::core::config::StorageConfig;
use crate::core::error::AppError;

pub struct LocalDiskStore {
    upload_dir: PathBuf,
    public_path: String,
}

impl LocalDiskStore {
    /// Create the store, making sure the upload directory exists
    pub async fn new(config: &StorageConfig) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to create upload directory '{}': {}",
                    config.upload_dir.display(),
                    e
                ))
            })?;

        info!(
            "Local blob store ready at {} (served under {})",
            config.upload_dir.display(),
            config.public_path
        );

        Ok(Self {
            upload_dir: config.upload_dir.clone(),
            public_path: config.public_path.trim_end_matches('/').to_string(),
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    /// Resolve a reference to a file inside the upload directory.
    /// References outside the public path or with nested segments are rejected.
    fn resolve(&self, blob_ref: &str) -> Option<PathBuf> {
        let name = blob_ref
            .strip_prefix(&self.public_path)?
            .strip_prefix('/')?;

        let is_plain_name = !name.is_empty()
            && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
            && name != ".."
            && name != ".";

        is_plain_name.then(|| self.upload_dir.join(name))
    }
}

#[async_trait]
impl BlobStore for LocalDiskStore {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        _content_type: &str,
    ) -> Result<String, AppError> {
        let name = generate_blob_name(original_filename);
        let path = self.upload_dir.join(&name);

        tokio::fs::write(&path, &data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write file '{}': {}", path.display(), e))
        })?;

        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(format!("{}/{}", self.public_path, name))
    }

    async fn delete(&self, blob_ref: &str) -> Result<(), AppError> {
        let path = self
            .resolve(blob_ref)
            .ok_or_else(|| AppError::BadRequest(format!("Not a local blob reference: {}", blob_ref)))?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!(
                "Failed to delete file '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MinIOConfig, StorageBackend};

    async fn store_in(dir: &Path) -> LocalDiskStore {
        let config = StorageConfig {
            backend: StorageBackend::Local,
            upload_dir: dir.to_path_buf(),
            public_path: "/uploads".to_string(),
            minio: MinIOConfig {
                endpoint: String::new(),
                public_endpoint: String::new(),
                access_key: String::new(),
                secret_key: String::new(),
                bucket: String::new(),
                region: String::new(),
                public_prefix: String::new(),
            },
        };
        LocalDiskStore::new(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_store_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let blob_ref = store
            .store(b"hello".to_vec(), "marks.pdf", "application/pdf")
            .await
            .unwrap();
        assert!(blob_ref.starts_with("/uploads/"));
        assert!(blob_ref.ends_with(".pdf"));

        let path = store.resolve(&blob_ref).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");

        store.delete(&blob_ref).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        store.delete("/uploads/123-abc.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_references_outside_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        assert!(store.resolve("/uploads/../Cargo.toml").is_none());
        assert!(store.resolve("/uploads/a/b.pdf").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("/uploads/").is_none());
        assert!(store.delete("/etc/passwd").await.is_err());
    }
}
