use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::store::{rollback_quietly, PortalStore, StoreTx};
use crate::features::audit::models::AuditAction;
use crate::features::audit::AuditLog;
use crate::features::auth::{RequestContext, RequestGuard};
use crate::features::files::models::{
    GrantBatchOutcome, GrantResult, PayrollFile, RevokeBatchOutcome, RevokeResult,
};
use crate::features::notifications::models::{FileInfo, NotificationSummary};
use crate::features::notifications::NotificationDispatcher;
use crate::features::users::models::User;

/// Read authorization and the grant/revoke state machine
///
/// Admins can read every active file; that rule is evaluated here and is
/// never stored as grant rows. Grant mutations run on a caller-supplied
/// transaction so they commit or roll back with the surrounding work.
pub struct AccessController {
    store: Arc<dyn PortalStore>,
    guard: Arc<RequestGuard>,
    audit: Arc<AuditLog>,
    notifier: Arc<NotificationDispatcher>,
}

impl AccessController {
    pub fn new(
        store: Arc<dyn PortalStore>,
        guard: Arc<RequestGuard>,
        audit: Arc<AuditLog>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            guard,
            audit,
            notifier,
        }
    }

    pub async fn can_access(&self, user_id: Uuid, file_id: Uuid) -> Result<bool> {
        match self.store.find_file(file_id).await? {
            Some(file) if file.is_active => {}
            _ => return Ok(false),
        }

        let user = match self.store.find_user(user_id).await? {
            Some(user) if user.is_active => user,
            _ => return Ok(false),
        };

        if user.is_admin() {
            return Ok(true);
        }

        self.store.grant_exists(file_id, user_id).await
    }

    /// Insert-if-absent; the file must be active and the user an active
    /// regular user
    pub async fn grant(
        &self,
        tx: &mut dyn StoreTx,
        file_id: Uuid,
        user_id: Uuid,
        granted_by: Uuid,
    ) -> Result<GrantResult> {
        match tx.find_file(file_id).await? {
            Some(file) if file.is_active => {}
            _ => {
                return Err(AppError::Forbidden(format!(
                    "Cannot grant access to inactive or unknown file {}",
                    file_id
                )))
            }
        }

        match tx.find_user(user_id).await? {
            Some(user) if user.is_admin() => {
                return Err(AppError::Forbidden(format!(
                    "Administrator {} already has access to every file",
                    user.username
                )))
            }
            Some(user) if user.is_active => {}
            _ => {
                return Err(AppError::Forbidden(format!(
                    "Cannot grant access to inactive or unknown user {}",
                    user_id
                )))
            }
        }

        let created = tx.insert_grant(file_id, user_id, granted_by).await?;
        Ok(GrantResult { created })
    }

    /// Delete-if-present; never fails on a missing grant
    pub async fn revoke(
        &self,
        tx: &mut dyn StoreTx,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<RevokeResult> {
        let removed = tx.delete_grant(file_id, user_id).await?;
        Ok(RevokeResult { removed })
    }

    pub async fn revoke_all(&self, tx: &mut dyn StoreTx, file_id: Uuid) -> Result<u64> {
        tx.delete_grants_for_file(file_id).await
    }

    /// Files the user may read, most recent first
    pub async fn list_accessible(&self, user_id: Uuid) -> Result<Vec<PayrollFile>> {
        let user = match self.store.find_user(user_id).await? {
            Some(user) if user.is_active => user,
            _ => return Ok(Vec::new()),
        };

        if user.is_admin() {
            return self.store.list_active_files().await;
        }

        self.store.list_granted_files(user_id).await
    }

    /// Active users holding a grant, ordered by full name
    pub async fn list_grantees(&self, file_id: Uuid) -> Result<Vec<User>> {
        self.store.list_grantees(file_id).await
    }

    async fn require_active_file(&self, tx: &mut dyn StoreTx, file_id: Uuid) -> Result<PayrollFile> {
        tx.find_file(file_id)
            .await?
            .filter(|f| f.is_active)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    /// Grants for each user not yet holding one, in a single transaction
    async fn apply_grants(
        &self,
        tx: &mut dyn StoreTx,
        file_id: Uuid,
        user_ids: &[Uuid],
        granted_by: Uuid,
    ) -> Result<(PayrollFile, Vec<User>, usize)> {
        let file = self.require_active_file(tx, file_id).await?;
        let mut newly_granted = Vec::new();
        let mut already_present = 0;

        for &user_id in user_ids {
            if self.grant(tx, file_id, user_id, granted_by).await?.created {
                if let Some(user) = tx.find_user(user_id).await? {
                    newly_granted.push(user);
                }
            } else {
                already_present += 1;
            }
        }

        Ok((file, newly_granted, already_present))
    }

    async fn notify(&self, ctx: &RequestContext, users: &[User], file: &PayrollFile) -> NotificationSummary {
        let outcomes = self
            .notifier
            .notify_grant(ctx, users, &FileInfo::from(file), &ctx.user.full_name)
            .await;
        NotificationSummary::from_outcomes(&outcomes)
    }

    pub async fn grant_many(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<GrantBatchOutcome> {
        self.guard.require_admin_mutation(ctx)?;

        let user_ids = dedupe(user_ids);
        if user_ids.is_empty() {
            return Err(AppError::Validation(
                "Please select at least one user".to_string(),
            ));
        }

        let mut tx = self.store.begin().await?;
        let applied = self
            .apply_grants(tx.as_mut(), file_id, &user_ids, ctx.user_id())
            .await;
        let (file, newly_granted, already_present) = match applied {
            Ok(applied) => applied,
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        tracing::info!(
            "Granted access to file {} for {} user(s), {} already present",
            file.id,
            newly_granted.len(),
            already_present
        );

        for user in &newly_granted {
            self.audit
                .record_for(
                    ctx,
                    AuditAction::AccessGranted,
                    format!(
                        "Granted access to file '{}' for user: {}",
                        file.title, user.full_name
                    ),
                )
                .await;
        }

        let notifications = self.notify(ctx, &newly_granted, &file).await;
        let headline = if newly_granted.is_empty() {
            "No new access granted (users may already have access).".to_string()
        } else {
            format!("Access granted to {} user(s).", newly_granted.len())
        };

        Ok(GrantBatchOutcome {
            granted: newly_granted.len(),
            already_present,
            notifications,
            message: notifications.describe(&headline),
        })
    }

    pub async fn revoke_many(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<RevokeBatchOutcome> {
        self.guard.require_admin_mutation(ctx)?;

        let user_ids = dedupe(user_ids);
        if user_ids.is_empty() {
            return Err(AppError::Validation(
                "Please select at least one user".to_string(),
            ));
        }

        let mut tx = self.store.begin().await?;
        let applied: Result<(PayrollFile, Vec<String>)> = async {
            let file = self.require_active_file(tx.as_mut(), file_id).await?;
            let mut removed = Vec::new();
            for &user_id in &user_ids {
                if self.revoke(tx.as_mut(), file_id, user_id).await?.removed {
                    let name = tx
                        .find_user(user_id)
                        .await?
                        .map(|u| u.full_name)
                        .unwrap_or_else(|| user_id.to_string());
                    removed.push(name);
                }
            }
            Ok((file, removed))
        }
        .await;

        let (file, removed) = match applied {
            Ok(applied) => applied,
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        for name in &removed {
            self.audit
                .record_for(
                    ctx,
                    AuditAction::AccessRevoked,
                    format!("Revoked access to file '{}' for user: {}", file.title, name),
                )
                .await;
        }

        Ok(RevokeBatchOutcome {
            revoked: removed.len() as u64,
            message: format!("Access revoked for {} user(s).", removed.len()),
        })
    }

    /// Grant to every active regular user
    pub async fn grant_all(&self, ctx: &RequestContext, file_id: Uuid) -> Result<GrantBatchOutcome> {
        self.guard.require_admin_mutation(ctx)?;

        let user_ids: Vec<Uuid> = self
            .store
            .list_active_regular_users()
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        let mut tx = self.store.begin().await?;
        let applied = self
            .apply_grants(tx.as_mut(), file_id, &user_ids, ctx.user_id())
            .await;
        let (file, newly_granted, already_present) = match applied {
            Ok(applied) => applied,
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        tracing::info!(
            "Granted access to file {} for all users ({} new)",
            file.id,
            newly_granted.len()
        );
        self.audit
            .record_for(
                ctx,
                AuditAction::AccessGrantedAll,
                format!(
                    "Granted access to file '{}' for all users ({} new)",
                    file.title,
                    newly_granted.len()
                ),
            )
            .await;

        let notifications = self.notify(ctx, &newly_granted, &file).await;
        let headline = format!("Access granted to all users ({} new).", newly_granted.len());

        Ok(GrantBatchOutcome {
            granted: newly_granted.len(),
            already_present,
            notifications,
            message: notifications.describe(&headline),
        })
    }

    pub async fn revoke_all_for_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<RevokeBatchOutcome> {
        self.guard.require_admin_mutation(ctx)?;

        let mut tx = self.store.begin().await?;
        let applied: Result<(PayrollFile, u64)> = async {
            let file = self.require_active_file(tx.as_mut(), file_id).await?;
            let revoked = self.revoke_all(tx.as_mut(), file_id).await?;
            Ok((file, revoked))
        }
        .await;

        let (file, revoked) = match applied {
            Ok(applied) => applied,
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        self.audit
            .record_for(
                ctx,
                AuditAction::AccessRevokedAll,
                format!(
                    "Revoked all access to file '{}' ({} grant(s))",
                    file.title, revoked
                ),
            )
            .await;

        Ok(RevokeBatchOutcome {
            revoked,
            message: format!("Access revoked for all users ({} grant(s)).", revoked),
        })
    }
}

/// Drop repeated ids, keeping first-seen order
pub(crate) fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
