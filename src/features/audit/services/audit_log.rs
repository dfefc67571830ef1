use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::store::PortalStore;
use crate::features::audit::models::{AuditAction, AuditFilter, AuditPage, AuditStats, NewAuditEntry};
use crate::features::auth::{RequestContext, RequestGuard};
use crate::shared::constants::{LOGS_PAGE_SIZE, MAX_RETENTION_DAYS, MIN_RETENTION_DAYS};

/// Append-only activity log
///
/// Writes never fail the operation being logged: errors are reported with
/// `tracing::error!` and dropped. Reads and retention are admin-only.
pub struct AuditLog {
    store: Arc<dyn PortalStore>,
    guard: Arc<RequestGuard>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn PortalStore>, guard: Arc<RequestGuard>) -> Self {
        Self { store, guard }
    }

    /// Append an entry; failures are logged and swallowed
    pub async fn record(
        &self,
        user_id: Option<Uuid>,
        action: AuditAction,
        description: impl Into<String>,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) {
        let entry = NewAuditEntry {
            user_id,
            action,
            description: description.into(),
            ip_address: ip_address.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
        };

        if let Err(e) = self.store.insert_audit_entry(entry).await {
            tracing::error!("Failed to record {} activity: {}", action, e);
        }
    }

    /// Append an entry attributed to the caller of `ctx`
    pub async fn record_for(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
        description: impl Into<String>,
    ) {
        self.record(
            Some(ctx.user_id()),
            action,
            description,
            ctx.ip_address.as_deref(),
            ctx.user_agent.as_deref(),
        )
        .await;
    }

    /// Delete entries older than `days_to_keep` days
    pub async fn purge(&self, ctx: &RequestContext, days_to_keep: i64) -> Result<u64> {
        self.guard.require_admin_mutation(ctx)?;

        if !(MIN_RETENTION_DAYS..=MAX_RETENTION_DAYS).contains(&days_to_keep) {
            return Err(AppError::Validation(format!(
                "Days to keep must be between {} and {}",
                MIN_RETENTION_DAYS, MAX_RETENTION_DAYS
            )));
        }

        let cutoff = Utc::now() - Duration::days(days_to_keep);
        let deleted = self.store.delete_audit_entries_before(cutoff).await?;

        tracing::info!(
            "Purged {} activity entries older than {} days",
            deleted,
            days_to_keep
        );

        self.record_for(
            ctx,
            AuditAction::LogsCleanup,
            format!(
                "Deleted {} activity log entries older than {} days",
                deleted, days_to_keep
            ),
        )
        .await;

        Ok(deleted)
    }

    /// Filtered listing, newest first, fixed page size; pages are 1-indexed
    pub async fn query(
        &self,
        ctx: &RequestContext,
        filter: &AuditFilter,
        page: i64,
    ) -> Result<AuditPage> {
        self.guard.require_admin(ctx)?;

        let page = page.max(1);
        let offset = (page - 1) * LOGS_PAGE_SIZE;
        let (entries, total) = self
            .store
            .query_audit_entries(filter, offset, LOGS_PAGE_SIZE)
            .await?;

        Ok(AuditPage {
            entries,
            total,
            page,
            page_size: LOGS_PAGE_SIZE,
        })
    }

    pub async fn stats(&self, ctx: &RequestContext) -> Result<AuditStats> {
        self.guard.require_admin(ctx)?;
        self.store.audit_stats(Utc::now()).await
    }

    /// Actions present in the log, for filter options
    pub async fn actions(&self, ctx: &RequestContext) -> Result<Vec<String>> {
        self.guard.require_admin(ctx)?;
        self.store.distinct_audit_actions().await
    }
}
