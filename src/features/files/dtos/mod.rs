mod file_dto;

pub use file_dto::{
    AdminFileResponseDto, DownloadQuery, FileResponseDto, GrantOutcomeDto, RevokeOutcomeDto,
    UploadOutcomeDto, UploadPayrollFilesDto, UserSelectionDto,
};
