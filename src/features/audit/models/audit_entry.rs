use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::UserRole;

/// Security-relevant event kinds, matching the `audit_action` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    FailedLogin,
    FileUpload,
    FileDownload,
    FileView,
    FileDelete,
    AccessGranted,
    AccessRevoked,
    AccessGrantedAll,
    AccessRevokedAll,
    FileAccessNotification,
    UserCreated,
    UserStatusChanged,
    PasswordReset,
    EmailTest,
    EmailTestFailed,
    LogsCleanup,
}

impl AuditAction {
    pub const ALL: [AuditAction; 18] = [
        AuditAction::Login,
        AuditAction::Logout,
        AuditAction::FailedLogin,
        AuditAction::FileUpload,
        AuditAction::FileDownload,
        AuditAction::FileView,
        AuditAction::FileDelete,
        AuditAction::AccessGranted,
        AuditAction::AccessRevoked,
        AuditAction::AccessGrantedAll,
        AuditAction::AccessRevokedAll,
        AuditAction::FileAccessNotification,
        AuditAction::UserCreated,
        AuditAction::UserStatusChanged,
        AuditAction::PasswordReset,
        AuditAction::EmailTest,
        AuditAction::EmailTestFailed,
        AuditAction::LogsCleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::FailedLogin => "failed_login",
            AuditAction::FileUpload => "file_upload",
            AuditAction::FileDownload => "file_download",
            AuditAction::FileView => "file_view",
            AuditAction::FileDelete => "file_delete",
            AuditAction::AccessGranted => "access_granted",
            AuditAction::AccessRevoked => "access_revoked",
            AuditAction::AccessGrantedAll => "access_granted_all",
            AuditAction::AccessRevokedAll => "access_revoked_all",
            AuditAction::FileAccessNotification => "file_access_notification",
            AuditAction::UserCreated => "user_created",
            AuditAction::UserStatusChanged => "user_status_changed",
            AuditAction::PasswordReset => "password_reset",
            AuditAction::EmailTest => "email_test",
            AuditAction::EmailTestFailed => "email_test_failed",
            AuditAction::LogsCleanup => "logs_cleanup",
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Unknown activity action '{}'", s))
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for an activity log row
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    /// `None` for system or anonymous events
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for appending an activity log row
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Activity log row joined with the acting user
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntryView {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub role: Option<UserRole>,
}

/// Filters combined with AND semantics
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub user_id: Option<Uuid>,
    /// Matches entries created on this UTC calendar day
    pub date: Option<NaiveDate>,
    /// Case-insensitive substring over description, action and user full name
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditStats {
    pub total: i64,
    pub today: i64,
    pub unique_users: i64,
    pub downloads_last_24h: i64,
}

/// One page of the activity log listing
#[derive(Debug, Clone)]
pub struct AuditPage {
    pub entries: Vec<AuditEntryView>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl AuditPage {
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.page_size - 1) / self.page_size
        }
    }
}
