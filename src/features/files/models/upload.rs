use uuid::Uuid;

use crate::features::files::models::PayrollFile;
use crate::features::notifications::models::NotificationSummary;

/// One file of a multipart batch, as received
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A batch upload: shared metadata, the files and the initial grantees
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub title: String,
    pub description: Option<String>,
    pub pay_period: Option<String>,
    pub grantee_ids: Vec<Uuid>,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub file_ids: Vec<Uuid>,
    pub notifications: NotificationSummary,
    pub message: String,
}

impl UploadOutcome {
    pub fn file_count(&self) -> usize {
        self.file_ids.len()
    }
}

#[derive(Debug, Clone)]
pub struct GrantBatchOutcome {
    pub granted: usize,
    pub already_present: usize,
    pub notifications: NotificationSummary,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RevokeBatchOutcome {
    pub revoked: u64,
    pub message: String,
}

/// How a download is presented to the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

/// Bytes and metadata for a successful download
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub file: PayrollFile,
    pub data: Vec<u8>,
}
