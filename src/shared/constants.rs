/// Fixed page size for the activity log listing
pub const LOGS_PAGE_SIZE: i64 = 50;

/// Bounds (inclusive) for the activity log retention window, in days
pub const MIN_RETENTION_DAYS: i64 = 1;
pub const MAX_RETENTION_DAYS: i64 = 365;

// =============================================================================
// STORAGE
// =============================================================================

/// Prefix of generated storage names (`payroll_<uuid>.<ext>`)
pub const STORED_FILE_PREFIX: &str = "payroll_";

/// MIME type recorded for uploaded payroll documents
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Fallback MIME type for non-PDF extensions allowed by configuration
pub const OCTET_STREAM_MIME_TYPE: &str = "application/octet-stream";
