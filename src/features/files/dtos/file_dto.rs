use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::{
    Disposition, FileWithAccess, GrantBatchOutcome, PayrollFile, RevokeBatchOutcome,
    UploadOutcome,
};
use crate::features::notifications::models::NotificationSummary;

/// Batch upload form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadPayrollFilesDto {
    /// One or more payroll documents (repeat the field per file)
    #[schema(format = Binary, content_media_type = "application/pdf")]
    pub files: Vec<String>,
    /// Title shared by every file of the batch
    #[schema(example = "March Payroll")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "2024-03")]
    pub pay_period: Option<String>,
    /// Users granted access to every uploaded file (repeat the field per user)
    pub selected_users: Option<Vec<Uuid>>,
    /// CSRF token, alternative to the `X-CSRF-Token` header
    pub csrf_token: Option<String>,
}

/// Payroll file metadata as seen by a reader
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub pay_period: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub download_count: i64,
}

impl From<PayrollFile> for FileResponseDto {
    fn from(file: PayrollFile) -> Self {
        Self {
            id: file.id,
            title: file.title,
            description: file.description,
            original_filename: file.original_filename,
            size_bytes: file.size_bytes,
            mime_type: file.mime_type,
            pay_period: file.pay_period,
            uploaded_at: file.uploaded_at,
            download_count: file.download_count,
        }
    }
}

/// Admin listing row: file metadata with uploader and current grantees
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminFileResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
    pub size_bytes: i64,
    pub pay_period: Option<String>,
    pub uploaded_by_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub download_count: i64,
    pub access_count: i64,
    /// Full names of the users holding a grant
    pub access_users: Vec<String>,
}

impl From<FileWithAccess> for AdminFileResponseDto {
    fn from(row: FileWithAccess) -> Self {
        let access_users = row
            .access_users
            .map(|names| names.split(", ").map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            original_filename: row.original_filename,
            size_bytes: row.size_bytes,
            pay_period: row.pay_period,
            uploaded_by_name: row.uploaded_by_name,
            uploaded_at: row.uploaded_at,
            download_count: row.download_count,
            access_count: row.access_count,
            access_users,
        }
    }
}

/// Users selected for a grant or revoke
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserSelectionDto {
    #[validate(length(min = 1, message = "Please select at least one user"))]
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadOutcomeDto {
    pub file_ids: Vec<Uuid>,
    pub file_count: usize,
    pub notifications: NotificationSummary,
}

impl From<UploadOutcome> for UploadOutcomeDto {
    fn from(outcome: UploadOutcome) -> Self {
        Self {
            file_count: outcome.file_count(),
            file_ids: outcome.file_ids,
            notifications: outcome.notifications,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantOutcomeDto {
    /// Users who did not hold a grant before
    pub granted: usize,
    pub already_present: usize,
    pub notifications: NotificationSummary,
}

impl From<GrantBatchOutcome> for GrantOutcomeDto {
    fn from(outcome: GrantBatchOutcome) -> Self {
        Self {
            granted: outcome.granted,
            already_present: outcome.already_present,
            notifications: outcome.notifications,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevokeOutcomeDto {
    pub revoked: u64,
}

impl From<RevokeBatchOutcome> for RevokeOutcomeDto {
    fn from(outcome: RevokeBatchOutcome) -> Self {
        Self {
            revoked: outcome.revoked,
        }
    }
}

/// Query parameters for a download
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DownloadQuery {
    /// Render in the browser instead of saving
    pub inline: Option<bool>,
}

impl DownloadQuery {
    pub fn disposition(&self) -> Disposition {
        if self.inline.unwrap_or(false) {
            Disposition::Inline
        } else {
            Disposition::Attachment
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_query_disposition() {
        assert_eq!(DownloadQuery::default().disposition(), Disposition::Attachment);
        let inline = DownloadQuery { inline: Some(true) };
        assert_eq!(inline.disposition(), Disposition::Inline);
    }

    #[test]
    fn test_user_selection_requires_users() {
        let empty = UserSelectionDto { user_ids: vec![] };
        assert!(empty.validate().is_err());
        let one = UserSelectionDto {
            user_ids: vec![Uuid::now_v7()],
        };
        assert!(one.validate().is_ok());
    }

    fn row(access_users: Option<&str>) -> FileWithAccess {
        FileWithAccess {
            id: Uuid::now_v7(),
            title: "March Payroll".to_string(),
            description: None,
            original_filename: "march.pdf".to_string(),
            size_bytes: 10,
            pay_period: Some("2024-03".to_string()),
            uploaded_by_name: Some("Admin".to_string()),
            uploaded_at: Utc::now(),
            download_count: 0,
            access_count: 2,
            access_users: access_users.map(str::to_string),
        }
    }

    #[test]
    fn test_admin_row_splits_grantee_names() {
        let dto = AdminFileResponseDto::from(row(Some("Ana Lima, Ben Okoro")));
        assert_eq!(dto.access_users, vec!["Ana Lima", "Ben Okoro"]);

        let dto = AdminFileResponseDto::from(row(None));
        assert!(dto.access_users.is_empty());
    }
}
