use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::BlobStorage;
use crate::core::error::{AppError, Result};

/// Filesystem storage rooted at the configured upload directory
pub struct LocalBlobStorage {
    base_path: PathBuf,
}

impl LocalBlobStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create the upload directory if needed
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            AppError::storage(format!(
                "Failed to create upload directory {:?}: {}",
                self.base_path, e
            ))
        })?;
        info!("Local storage ready at {}", self.base_path.display());
        Ok(())
    }

    /// Resolve a key to a path under the root, rejecting traversal
    fn full_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::storage(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn write(&self, key: &str, data: &[u8], _content_type: &str) -> Result<()> {
        let path = self.full_path(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    AppError::storage(format!("Refusing to overwrite existing file '{}'", key))
                } else {
                    AppError::storage(format!("Failed to open '{}' for writing: {}", key, e))
                }
            })?;

        let written: std::io::Result<()> = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            // Do not leave a truncated file behind
            let _ = fs::remove_file(&path).await;
            return Err(AppError::storage(format!(
                "Failed to write '{}': {}",
                key, e
            )));
        }

        debug!("Stored '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.full_path(key)?;
        fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::NotFound("File not found on server".to_string())
            } else {
                AppError::storage(format!("Failed to read '{}': {}", key, e))
            }
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.full_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted '{}'", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::storage(format!(
                "Failed to delete '{}': {}",
                key, e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.full_path(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| AppError::storage(format!("Failed to stat '{}': {}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());

        storage.write("payroll_a.pdf", b"%PDF-1.4", "application/pdf").await.unwrap();
        assert!(storage.exists("payroll_a.pdf").await.unwrap());
        assert_eq!(storage.read("payroll_a.pdf").await.unwrap(), b"%PDF-1.4");

        storage.delete("payroll_a.pdf").await.unwrap();
        assert!(!storage.exists("payroll_a.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_write_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());

        storage.write("payroll_a.pdf", b"first", "application/pdf").await.unwrap();
        let err = storage.write("payroll_a.pdf", b"second", "application/pdf").await.unwrap_err();

        assert!(matches!(err, AppError::Storage { .. }));
        assert_eq!(storage.read("payroll_a.pdf").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());
        storage.delete("nothing.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());

        for key in ["../escape.pdf", "/etc/passwd", ""] {
            assert!(storage.write(key, b"x", "application/pdf").await.is_err(), "key {:?}", key);
        }
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());
        let err = storage.read("missing.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
