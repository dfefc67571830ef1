mod audit_entry;

pub use audit_entry::{
    AuditAction, AuditEntry, AuditEntryView, AuditFilter, AuditPage, AuditStats, NewAuditEntry,
};
