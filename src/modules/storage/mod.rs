//! Storage module for payroll documents
//!
//! [`BlobStorage`] is the byte store used by the upload saga. It has no
//! transactions of its own: callers write first and compensate with
//! `delete` when the surrounding database work fails.
//!
//! Two backends are provided: a local directory and MinIO/S3.

mod local;
mod minio_client;

pub use local::LocalBlobStorage;
pub use minio_client::MinIOClient;

use async_trait::async_trait;

use crate::core::error::Result;

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write bytes under `key`; must fail rather than overwrite an existing object
    async fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()>;

    async fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete the object; deleting a missing object is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;
}
