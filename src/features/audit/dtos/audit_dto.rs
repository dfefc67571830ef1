use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::audit::models::{AuditAction, AuditEntryView, AuditFilter, AuditStats};
use crate::features::users::models::UserRole;

/// Query parameters for the activity log listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AuditLogQuery {
    /// Action name, e.g. `file_download`
    pub action: Option<String>,
    pub user_id: Option<Uuid>,
    /// UTC calendar day (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    /// Substring matched against description, action and user name
    pub search: Option<String>,
    /// Page number (1-indexed, default: 1)
    #[param(minimum = 1)]
    pub page: Option<i64>,
}

impl AuditLogQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn to_filter(&self) -> Result<AuditFilter, AppError> {
        let action = match self.action.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => Some(a.parse::<AuditAction>().map_err(AppError::Validation)?),
            _ => None,
        };

        Ok(AuditFilter {
            action,
            user_id: self.user_id,
            date: self.date,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryResponseDto {
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

impl From<AuditEntryView> for AuditEntryResponseDto {
    fn from(view: AuditEntryView) -> Self {
        Self {
            id: view.id,
            user_id: view.user_id,
            action: view.action,
            description: view.description,
            ip_address: view.ip_address,
            user_agent: view.user_agent,
            created_at: view.created_at,
            full_name: view.full_name,
            username: view.username,
            role: view.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditStatsResponseDto {
    pub total: i64,
    pub today: i64,
    pub unique_users: i64,
    pub downloads_last_24h: i64,
    /// Distinct actions present in the log
    pub actions: Vec<String>,
}

impl AuditStatsResponseDto {
    pub fn new(stats: AuditStats, actions: Vec<String>) -> Self {
        Self {
            total: stats.total,
            today: stats.today,
            unique_users: stats.unique_users,
            downloads_last_24h: stats.downloads_last_24h,
            actions,
        }
    }
}

/// Request DTO for the retention purge
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CleanupLogsDto {
    #[validate(range(min = 1, max = 365, message = "Days to keep must be between 1 and 365"))]
    pub days_to_keep: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CleanupLogsResponseDto {
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_ignored() {
        let query = AuditLogQuery {
            action: Some(" ".to_string()),
            search: Some("".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert!(filter.action.is_none());
        assert!(filter.search.is_none());
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_unknown_action_is_validation_error() {
        let query = AuditLogQuery {
            action: Some("file_shred".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.to_filter(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_cleanup_range_validation() {
        assert!(CleanupLogsDto { days_to_keep: 90 }.validate().is_ok());
        assert!(CleanupLogsDto { days_to_keep: 0 }.validate().is_err());
        assert!(CleanupLogsDto { days_to_keep: 400 }.validate().is_err());
    }
}
