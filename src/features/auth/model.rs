use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::{User, UserRole};

/// Identity resolved by the auth middleware for the current request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    /// Session identifier carried by the access token, keys the CSRF token
    pub session_id: String,
}

impl AuthenticatedUser {
    pub fn from_user(user: &User, session_id: impl Into<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            session_id: session_id.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Client metadata recorded with activity entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Request-scoped context passed explicitly into every service call
///
/// Carries who is calling, the CSRF token they presented (if any) and the
/// client metadata recorded in the activity log.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: AuthenticatedUser,
    pub csrf_token: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(user: AuthenticatedUser) -> Self {
        Self {
            user,
            csrf_token: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_client(mut self, client: ClientInfo) -> Self {
        self.ip_address = client.ip_address;
        self.user_agent = client.user_agent;
        self
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}
