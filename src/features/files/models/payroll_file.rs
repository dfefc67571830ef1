use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an uploaded payroll document
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PayrollFile {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
    pub stored_path: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub pay_period: Option<String>,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
    pub download_count: i64,
    pub is_active: bool,
}

/// Data for inserting a payroll file row inside an upload transaction
#[derive(Debug, Clone)]
pub struct NewPayrollFile {
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
    pub stored_path: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub pay_period: Option<String>,
    pub uploaded_by: Uuid,
}

/// Active file joined with uploader name and current grantees (admin listing)
#[derive(Debug, Clone, FromRow)]
pub struct FileWithAccess {
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
    pub access_users: Option<String>,
}
