use std::sync::Arc;

use chrono::Utc;
use minijinja::context;
use validator::ValidateEmail;

use crate::core::error::{AppError, Result};
use crate::features::audit::models::AuditAction;
use crate::features::audit::AuditLog;
use crate::features::auth::{RequestContext, RequestGuard};
use crate::features::notifications::models::{FileInfo, NotificationOutcome};
use crate::features::users::models::User;
use crate::modules::mailer::MailTransport;
use crate::shared::templates::{render_template, FILE_ACCESS_NOTIFICATION, TEST_EMAIL};

/// Best-effort "new payroll file available" emails
///
/// Each recipient gets one isolated attempt; the outcome is written to the
/// activity log per recipient and never turned into an error.
pub struct NotificationDispatcher {
    transport: Arc<dyn MailTransport>,
    audit: Arc<AuditLog>,
    guard: Arc<RequestGuard>,
    system_name: String,
    portal_url: String,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        audit: Arc<AuditLog>,
        guard: Arc<RequestGuard>,
        system_name: impl Into<String>,
        portal_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            audit,
            guard,
            system_name: system_name.into(),
            portal_url: portal_url.into(),
        }
    }

    pub fn subject(file_info: &FileInfo) -> String {
        format!("New Payroll File Available: {}", file_info.title)
    }

    fn render_body(&self, recipient: &User, file_info: &FileInfo, actor_name: &str) -> Option<String> {
        let rendered = render_template(
            FILE_ACCESS_NOTIFICATION,
            context! {
                system_name => &self.system_name,
                recipient_name => &recipient.full_name,
                actor_name => actor_name,
                title => &file_info.title,
                description => file_info.description.as_deref().filter(|d| !d.trim().is_empty()),
                pay_period => file_info.pay_period.as_deref().filter(|p| !p.trim().is_empty()),
                portal_url => &self.portal_url,
            },
        );

        match rendered {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("Failed to render notification for {}: {}", recipient.email, e);
                None
            }
        }
    }

    pub async fn notify_grant(
        &self,
        ctx: &RequestContext,
        users: &[User],
        file_info: &FileInfo,
        actor_name: &str,
    ) -> Vec<NotificationOutcome> {
        let subject = Self::subject(file_info);
        let mut outcomes = Vec::with_capacity(users.len());

        for user in users {
            let success = match self.render_body(user, file_info, actor_name) {
                Some(body) => self.transport.send(&user.email, &subject, &body).await,
                None => false,
            };

            if !success {
                tracing::warn!("Notification to {} for '{}' failed", user.email, file_info.title);
            }

            let status = if success { "sent" } else { "failed" };
            self.audit
                .record(
                    Some(user.id),
                    AuditAction::FileAccessNotification,
                    format!(
                        "Email notification {} to {} for file: {}",
                        status, user.email, file_info.title
                    ),
                    ctx.ip_address.as_deref(),
                    ctx.user_agent.as_deref(),
                )
                .await;

            outcomes.push(NotificationOutcome {
                user_id: user.id,
                email: user.email.clone(),
                success,
            });
        }

        outcomes
    }

    /// Send a delivery check to `recipient` (admin only)
    ///
    /// Returns whether the transport accepted the message. A rejected
    /// message is recorded as `email_test_failed`, not returned as an error.
    pub async fn send_test_email(&self, ctx: &RequestContext, recipient: &str) -> Result<bool> {
        self.guard.require_admin_mutation(ctx)?;

        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(AppError::Validation(
                "Please enter an email address".to_string(),
            ));
        }
        if !recipient.validate_email() {
            return Err(AppError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }

        let subject = format!("Test Email from {}", self.system_name);
        let body = render_template(
            TEST_EMAIL,
            context! {
                system_name => &self.system_name,
                actor_name => &ctx.user.full_name,
                sent_at => Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            },
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        let success = self.transport.send(recipient, &subject, &body).await;
        let (action, description) = if success {
            tracing::info!("Test email sent to {}", recipient);
            (AuditAction::EmailTest, format!("Test email sent to: {}", recipient))
        } else {
            tracing::warn!("Test email to {} failed", recipient);
            (
                AuditAction::EmailTestFailed,
                format!("Failed to send test email to: {}", recipient),
            )
        };
        self.audit.record_for(ctx, action, description).await;

        Ok(success)
    }
}
