mod file_access;
mod payroll_file;
mod upload;

pub use file_access::{GrantResult, NewDownloadLog, RevokeResult};
pub use payroll_file::{FileWithAccess, NewPayrollFile, PayrollFile};
pub use upload::{
    Disposition, FileDownload, GrantBatchOutcome, RevokeBatchOutcome, UploadOutcome,
    UploadRequest, UploadedFile,
};
