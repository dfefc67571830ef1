use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::core::store::PortalStore;
use crate::features::audit::models::AuditAction;
use crate::features::audit::AuditLog;
use crate::features::auth::guards::RequestGuard;
use crate::features::auth::model::{AuthenticatedUser, ClientInfo, RequestContext};
use crate::features::auth::password::{verify_password, CredentialHasher};
use crate::features::auth::token::{IssuedToken, TokenIssuer};
use crate::features::users::models::{User, UserCredentials};

/// Successful sign-in
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub user: AuthenticatedUser,
    /// Anti-forgery token for the new session
    pub csrf_token: String,
}

/// Service for authentication operations (login, logout, CSRF issuance)
pub struct AuthService {
    store: Arc<dyn PortalStore>,
    hasher: Arc<dyn CredentialHasher>,
    issuer: TokenIssuer,
    guard: Arc<RequestGuard>,
    audit: Arc<AuditLog>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn PortalStore>,
        hasher: Arc<dyn CredentialHasher>,
        issuer: TokenIssuer,
        guard: Arc<RequestGuard>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            guard,
            audit,
        }
    }

    /// Verify credentials and open a session
    ///
    /// Unknown, inactive and password-less accounts fail exactly like a wrong
    /// password, and every failure is recorded as `failed_login` without a user.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<LoginOutcome> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Please enter both username and password".to_string(),
            ));
        }

        let Some(user) = self.verify_credentials(username, password).await? else {
            tracing::warn!("Failed login attempt for username {}", username);
            self.audit
                .record(
                    None,
                    AuditAction::FailedLogin,
                    format!("Failed login attempt for username: {}", username),
                    client.ip_address.as_deref(),
                    client.user_agent.as_deref(),
                )
                .await;
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        };

        let token = self.issuer.issue(user.id)?;
        let ctx = RequestContext::new(AuthenticatedUser::from_user(&user, &token.session_id))
            .with_client(client);
        let csrf_token = self.guard.issue_csrf_token(&ctx);

        tracing::info!("User {} ({}) logged in", user.username, user.id);
        self.audit
            .record_for(&ctx, AuditAction::Login, "User logged in successfully")
            .await;

        Ok(LoginOutcome {
            token,
            user: ctx.user,
            csrf_token,
        })
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(UserCredentials {
            user,
            password_hash: Some(digest),
        }) = self.store.find_active_credentials(username).await?
        else {
            return Ok(None);
        };

        let valid = verify_password(&self.hasher, password.to_string(), digest).await;
        Ok(valid.then_some(user))
    }

    /// Record the end of a session; the client discards its token
    pub async fn logout(&self, ctx: &RequestContext) {
        tracing::info!("User {} ({}) logged out", ctx.user.username, ctx.user.id);
        self.audit
            .record_for(ctx, AuditAction::Logout, "User logged out")
            .await;
    }

    pub fn issue_csrf_token(&self, ctx: &RequestContext) -> String {
        self.guard.issue_csrf_token(ctx)
    }
}
