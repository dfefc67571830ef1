//! Authorization guards.
//!
//! [`RequestGuard`] is the policy the core services call with an explicit
//! [`RequestContext`] before opening any transaction.

use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::csrf::CsrfTokenStore;
use crate::features::auth::model::RequestContext;

/// Role and anti-forgery checks shared by every service entry point
pub struct RequestGuard {
    csrf: Arc<dyn CsrfTokenStore>,
}

impl RequestGuard {
    pub fn new(csrf: Arc<dyn CsrfTokenStore>) -> Self {
        Self { csrf }
    }

    pub fn issue_csrf_token(&self, ctx: &RequestContext) -> String {
        self.csrf.issue_token(&ctx.user.session_id)
    }

    pub fn require_admin(&self, ctx: &RequestContext) -> Result<(), AppError> {
        if !ctx.user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(())
    }

    pub fn require_csrf(&self, ctx: &RequestContext) -> Result<(), AppError> {
        let valid = ctx
            .csrf_token
            .as_deref()
            .map(|token| self.csrf.validate(&ctx.user.session_id, token))
            .unwrap_or(false);

        if !valid {
            return Err(AppError::Forbidden("Invalid CSRF token".to_string()));
        }
        Ok(())
    }

    /// Admin role plus a valid CSRF token, for every mutating admin action
    pub fn require_admin_mutation(&self, ctx: &RequestContext) -> Result<(), AppError> {
        self.require_admin(ctx)?;
        self.require_csrf(ctx)
    }
}
