use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::AppError;

/// Claims the portal expects in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,
    /// Session id, also used to key CSRF tokens
    pub sid: String,
    pub iat: u64,
    pub exp: u64,
}

pub struct JwtValidator {
    decoding_key: DecodingKey,
    leeway: u64,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid access token: {}", e)))?;

        if token_data.claims.sid.is_empty() {
            return Err(AppError::Unauthorized(
                "Access token has no session".to_string(),
            ));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, claims: &SessionClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp_offset: i64) -> SessionClaims {
        let now = chrono::Utc::now().timestamp();
        SessionClaims {
            sub: Uuid::now_v7(),
            sid: "session-1".to_string(),
            iat: now as u64,
            exp: (now + exp_offset) as u64,
        }
    }

    #[test]
    fn test_valid_token() {
        let validator = JwtValidator::new("secret", Duration::from_secs(0));
        let expected = claims(600);
        let decoded = validator
            .validate_token(&token("secret", &expected))
            .unwrap();
        assert_eq!(decoded.sub, expected.sub);
        assert_eq!(decoded.sid, "session-1");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::new("secret", Duration::from_secs(0));
        let err = validator
            .validate_token(&token("other", &claims(600)))
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::new("secret", Duration::from_secs(0));
        assert!(validator
            .validate_token(&token("secret", &claims(-600)))
            .is_err());
    }
}
