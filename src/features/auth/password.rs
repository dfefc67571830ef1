//! Password digests.
//!
//! Services hold an `Arc<dyn CredentialHasher>` and never see the algorithm.
//! Hashing is CPU-bound, so async callers go through [`hash_password`] and
//! [`verify_password`], which move the work onto the blocking pool.

use std::sync::Arc;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::core::error::{AppError, Result};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// `false` for a wrong password and for a digest that cannot be parsed
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id with the crate's default parameters, PHC string output
#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| AppError::Internal(format!("Failed to generate salt: {}", e)))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::Internal(format!("Failed to encode salt: {}", e)))?;

        let digest = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(digest.to_string())
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password digest is malformed: {}", e);
                false
            }
        }
    }
}

/// Reject passwords shorter than [`MIN_PASSWORD_LENGTH`]
pub fn check_password_length(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub async fn hash_password(hasher: &Arc<dyn CredentialHasher>, password: String) -> Result<String> {
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

pub async fn verify_password(
    hasher: &Arc<dyn CredentialHasher>,
    password: String,
    digest: String,
) -> bool {
    let hasher = Arc::clone(hasher);
    match tokio::task::spawn_blocking(move || hasher.verify(&password, &digest)).await {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_only_the_same_password() {
        let hasher = Argon2Hasher::new();
        let digest = hasher.hash("s3cret!").unwrap();

        assert!(digest.starts_with("$argon2"));
        assert!(hasher.verify("s3cret!", &digest));
        assert!(!hasher.verify("s3cret?", &digest));
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let hasher = Argon2Hasher::new();
        assert_ne!(hasher.hash("repeat").unwrap(), hasher.hash("repeat").unwrap());
    }

    #[test]
    fn test_malformed_digest_never_verifies() {
        let hasher = Argon2Hasher::new();
        assert!(!hasher.verify("anything", ""));
        assert!(!hasher.verify("anything", "plaintext"));
    }

    #[test]
    fn test_password_length() {
        assert!(check_password_length("abcdef").is_ok());
        assert!(matches!(
            check_password_length("abcde"),
            Err(AppError::Validation(_))
        ));
        // counted in characters, not bytes
        assert!(check_password_length("ééééé").is_err());
    }

    #[tokio::test]
    async fn test_blocking_helpers_round_trip() {
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());
        let digest = hash_password(&hasher, "payday".to_string()).await.unwrap();
        assert!(verify_password(&hasher, "payday".to_string(), digest.clone()).await);
        assert!(!verify_password(&hasher, "payday!".to_string(), digest).await);
    }
}
