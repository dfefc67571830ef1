//! MinIO/S3-compatible storage client
//!
//! Payroll documents are private: objects live under a single key prefix and
//! are only ever streamed back through the download endpoint after an access
//! check. Uses the rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::BlobStorage;
use crate::core::config::MinIOConfig;
use crate::core::error::{AppError, Result};

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    prefix: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration
    pub async fn new(config: MinIOConfig) -> Result<Self> {
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
            prefix: config.prefix.trim_matches('/').to_string(),
        };

        client.ensure_bucket_exists().await?;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.prefix
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<()> {
        match Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
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
                Ok(())
            }
        }
    }

    /// Full object key for a storage key (e.g. "payroll/payroll_0190.pdf")
    pub fn object_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }
}

#[async_trait]
impl BlobStorage for MinIOClient {
    async fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let object_key = self.object_key(key);

        // S3 has no create-only put; generated keys are unique, this guards the invariant
        if self.exists(key).await? {
            return Err(AppError::storage(format!(
                "Refusing to overwrite existing object '{}'",
                object_key
            )));
        }

        self.bucket
            .put_object_with_content_type(&object_key, data, content_type)
            .await
            .map_err(|e| {
                AppError::storage(format!("Failed to upload file '{}': {}", object_key, e))
            })?;

        debug!(
            "Uploaded file '{}' to bucket '{}'",
            object_key,
            self.bucket.name()
        );
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let object_key = self.object_key(key);
        let response = self.bucket.get_object(&object_key).await.map_err(|e| {
            AppError::storage(format!("Failed to download file '{}': {}", object_key, e))
        })?;

        debug!(
            "Downloaded file '{}' from bucket '{}'",
            object_key,
            self.bucket.name()
        );
        Ok(response.to_vec())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let object_key = self.object_key(key);
        self.bucket.delete_object(&object_key).await.map_err(|e| {
            AppError::storage(format!("Failed to delete file '{}': {}", object_key, e))
        })?;

        debug!(
            "Deleted file '{}' from bucket '{}'",
            object_key,
            self.bucket.name()
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let object_key = self.object_key(key);
        match self.bucket.head_object(&object_key).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::storage(format!(
                        "Failed to check if file '{}' exists: {}",
                        object_key, e
                    )))
                }
            }
        }
    }
}
