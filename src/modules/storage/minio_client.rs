//! MinIO/S3-compatible blob store
//!
//! Documents are written under the public prefix of the bucket and referenced by
//! their public URL. The bucket needs anonymous read on that prefix, e.g.
//! `mc anonymous set download minio/<bucket>/public`.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::{generate_blob_name, BlobStore};
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

/// Folder inside the public prefix holding student documents
const DOCUMENTS_FOLDER: &str = "documents";

pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    public_prefix: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration and make sure the bucket exists
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            public_prefix: config.public_prefix,
        };

        client.ensure_bucket_exists().await;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, public_prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.public_prefix
        );

        Ok(client)
    }

    /// Create the bucket if missing. Errors other than "already exists" are logged.
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Public URL of an object key
    pub fn get_file_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }

    /// Extract the object key from a URL issued by [`get_file_url`](Self::get_file_url)
    /// (either endpoint is accepted)
    pub fn extract_key_from_url(&self, url: &str) -> Option<String> {
        [&self.public_endpoint, &self.endpoint]
            .iter()
            .map(|endpoint| format!("{}/{}/", endpoint, self.bucket.name()))
            .find_map(|prefix| url.strip_prefix(prefix.as_str()).map(str::to_string))
            .filter(|key| key.starts_with(&format!("{}/", self.public_prefix)))
    }
}

#[async_trait]
impl BlobStore for MinIOClient {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
    ) -> Result<String, AppError> {
        let key = format!(
            "{}/{}/{}",
            self.public_prefix,
            DOCUMENTS_FOLDER,
            generate_blob_name(original_filename)
        );

        self.bucket
            .put_object_with_content_type(&key, &data, content_type)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to upload file '{}': {}", key, e)))?;

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(self.get_file_url(&key))
    }

    async fn delete(&self, blob_ref: &str) -> Result<(), AppError> {
        let key = self.extract_key_from_url(blob_ref).ok_or_else(|| {
            AppError::BadRequest(format!("Not an object URL of this bucket: {}", blob_ref))
        })?;

        self.bucket
            .delete_object(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!("Deleted file '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }
}
