use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::SessionClaims;

/// Access token minted at login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub session_id: String,
    pub expires_in: i64,
}

/// Signs HS256 session tokens with the secret [`super::JwtValidator`] checks
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// New token bound to a fresh session id
    pub fn issue(&self, user_id: Uuid) -> Result<IssuedToken, AppError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = SessionClaims {
            sub: user_id,
            sid: Uuid::new_v4().simple().to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign access token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            session_id: claims.sid,
            expires_in: self.ttl.as_secs() as i64,
        })
    }
}
