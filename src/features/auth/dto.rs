use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::model::AuthenticatedUser;
use super::service::LoginOutcome;
use crate::features::users::models::UserRole;

/// Request DTO for username/password sign-in
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    pub username: String,
    pub password: String,
}

/// Response DTO for a successful sign-in
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    /// Signed session token for the `Authorization: Bearer` header
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiry time in seconds
    pub expires_in: i64,
    /// Anti-forgery token bound to the new session
    pub csrf_token: String,
    pub user: MeResponseDto,
}

impl From<LoginOutcome> for LoginResponseDto {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            access_token: outcome.token.access_token,
            token_type: "Bearer".to_string(),
            expires_in: outcome.token.expires_in,
            csrf_token: outcome.csrf_token,
            user: outcome.user.into(),
        }
    }
}

/// DTO for /api/auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Anti-forgery token to echo in `X-CSRF-Token` on mutating requests
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CsrfTokenDto {
    pub csrf_token: String,
    pub header_name: String,
}
