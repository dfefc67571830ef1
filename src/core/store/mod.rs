//! Transactional persistence seam
//!
//! Services talk to the relational store through [`PortalStore`] for
//! single-statement reads and appends, and through [`StoreTx`] whenever
//! several rows must change atomically (upload batches, soft delete with
//! grant cascade, download accounting, bulk grant/revoke).
//!
//! A transaction that is dropped without `commit` is rolled back by the
//! backing store.

mod postgres;

pub use postgres::PgPortalStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::audit::models::{
    AuditEntry, AuditEntryView, AuditFilter, AuditStats, NewAuditEntry,
};
use crate::features::files::models::{FileWithAccess, NewDownloadLog, NewPayrollFile, PayrollFile};
use crate::features::users::models::{NewUser, User, UserCredentials, UserOverview};

#[async_trait]
pub trait PortalStore: Send + Sync {
    /// Open a unit of work
    async fn begin(&self) -> Result<Box<dyn StoreTx>>;

    // Users

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Users with access and download counters, newest first
    async fn list_user_overviews(&self) -> Result<Vec<UserOverview>>;

    /// Active non-admin users ordered by full name
    async fn list_active_regular_users(&self) -> Result<Vec<User>>;

    async fn set_user_active(&self, user_id: Uuid, active: bool) -> Result<bool>;

    /// Exact username match among active accounts
    async fn find_active_credentials(&self, username: &str) -> Result<Option<UserCredentials>>;

    /// `None` when the username or email is already taken
    async fn insert_user(&self, user: &NewUser) -> Result<Option<User>>;

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<bool>;

    // Files and grants

    async fn find_file(&self, file_id: Uuid) -> Result<Option<PayrollFile>>;

    async fn grant_exists(&self, file_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Active files ordered by upload time, most recent first
    async fn list_active_files(&self) -> Result<Vec<PayrollFile>>;

    /// Distinct active files granted to the user, most recent first
    async fn list_granted_files(&self, user_id: Uuid) -> Result<Vec<PayrollFile>>;

    /// Active users holding a grant on the file, ordered by full name
    async fn list_grantees(&self, file_id: Uuid) -> Result<Vec<User>>;

    async fn list_files_with_access(&self) -> Result<Vec<FileWithAccess>>;

    // Activity log

    async fn insert_audit_entry(&self, entry: NewAuditEntry) -> Result<AuditEntry>;

    async fn query_audit_entries(
        &self,
        filter: &AuditFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AuditEntryView>, i64)>;

    async fn audit_stats(&self, now: DateTime<Utc>) -> Result<AuditStats>;

    async fn distinct_audit_actions(&self) -> Result<Vec<String>>;

    /// Delete every entry created strictly before `cutoff`
    async fn delete_audit_entries_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait StoreTx: Send {
    async fn find_user(&mut self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_file(&mut self, file_id: Uuid) -> Result<Option<PayrollFile>>;

    async fn insert_file(&mut self, file: &NewPayrollFile) -> Result<PayrollFile>;

    /// Flip the active flag off; `false` if the file was missing or already inactive
    async fn deactivate_file(&mut self, file_id: Uuid) -> Result<bool>;

    /// Insert-if-absent; `true` only when a new row was created
    async fn insert_grant(&mut self, file_id: Uuid, user_id: Uuid, granted_by: Uuid)
        -> Result<bool>;

    /// Delete-if-present; `true` only when a row was removed
    async fn delete_grant(&mut self, file_id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn delete_grants_for_file(&mut self, file_id: Uuid) -> Result<u64>;

    /// Append a download row and bump the file's counter
    async fn record_download(&mut self, download: &NewDownloadLog) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Roll back after a failed unit of work; a rollback error is only logged
/// because the original failure is what the caller reports
pub async fn rollback_quietly(tx: Box<dyn StoreTx>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!("Rollback failed: {}", e);
    }
}
