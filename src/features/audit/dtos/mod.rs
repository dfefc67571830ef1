mod audit_dto;

pub use audit_dto::{
    AuditEntryResponseDto, AuditLogQuery, AuditStatsResponseDto, CleanupLogsDto,
    CleanupLogsResponseDto,
};
