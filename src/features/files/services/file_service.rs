use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::store::{rollback_quietly, PortalStore};
use crate::features::audit::models::AuditAction;
use crate::features::audit::AuditLog;
use crate::features::auth::{RequestContext, RequestGuard};
use crate::features::files::models::{
    Disposition, FileDownload, FileWithAccess, NewDownloadLog, PayrollFile,
};
use crate::features::files::services::AccessController;
use crate::features::users::models::User;
use crate::modules::storage::BlobStorage;

/// Service for reading, downloading and retiring payroll files
pub struct FileService {
    store: Arc<dyn PortalStore>,
    storage: Arc<dyn BlobStorage>,
    access: Arc<AccessController>,
    audit: Arc<AuditLog>,
    guard: Arc<RequestGuard>,
}

impl FileService {
    pub fn new(
        store: Arc<dyn PortalStore>,
        storage: Arc<dyn BlobStorage>,
        access: Arc<AccessController>,
        audit: Arc<AuditLog>,
        guard: Arc<RequestGuard>,
    ) -> Self {
        Self {
            store,
            storage,
            access,
            audit,
            guard,
        }
    }

    /// Admin listing of active files with grantee counts and names
    pub async fn list_all(&self, ctx: &RequestContext) -> Result<Vec<FileWithAccess>> {
        self.guard.require_admin(ctx)?;
        self.store.list_files_with_access().await
    }

    /// Files the caller may read, most recent first
    pub async fn list_accessible(&self, ctx: &RequestContext) -> Result<Vec<PayrollFile>> {
        self.access.list_accessible(ctx.user_id()).await
    }

    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> Result<PayrollFile> {
        let file = self.find_active(file_id).await?;

        if !self.access.can_access(ctx.user_id(), file_id).await? {
            return Err(AppError::Forbidden(
                "You do not have access to this file".to_string(),
            ));
        }

        Ok(file)
    }

    /// Current grantees of an active file
    pub async fn grantees(&self, ctx: &RequestContext, file_id: Uuid) -> Result<Vec<User>> {
        self.guard.require_admin(ctx)?;
        self.find_active(file_id).await?;
        self.access.list_grantees(file_id).await
    }

    /// Deactivate the file and drop every grant in one transaction
    ///
    /// Stored bytes are kept; the file simply disappears from every listing.
    pub async fn soft_delete(&self, ctx: &RequestContext, file_id: Uuid) -> Result<PayrollFile> {
        self.guard.require_admin_mutation(ctx)?;

        let mut tx = self.store.begin().await?;
        let applied: Result<(PayrollFile, u64)> = async {
            let file = tx
                .find_file(file_id)
                .await?
                .filter(|f| f.is_active)
                .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;
            tx.deactivate_file(file_id).await?;
            let revoked = self.access.revoke_all(tx.as_mut(), file_id).await?;
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

        tracing::info!(
            "Soft-deleted file {} and revoked {} grant(s)",
            file.id,
            revoked
        );
        self.audit
            .record_for(
                ctx,
                AuditAction::FileDelete,
                format!("Deleted file: {}", file.title),
            )
            .await;

        Ok(file)
    }

    /// Read the bytes of an accessible file and count the download
    pub async fn download(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        disposition: Disposition,
    ) -> Result<FileDownload> {
        let file = self.find_active(file_id).await?;

        if !self.access.can_access(ctx.user_id(), file_id).await? {
            tracing::warn!(
                "User {} denied access to file {}",
                ctx.user_id(),
                file_id
            );
            return Err(AppError::Forbidden(
                "You do not have access to this file".to_string(),
            ));
        }

        if !self.storage.exists(&file.stored_path).await? {
            tracing::error!(
                "Stored bytes missing for file {} ({})",
                file.id,
                file.stored_path
            );
            return Err(AppError::NotFound("File not found on server".to_string()));
        }

        let data = self.storage.read(&file.stored_path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), file.stored_path);

        let mut tx = self.store.begin().await?;
        let recorded = tx
            .record_download(&NewDownloadLog {
                file_id,
                user_id: ctx.user_id(),
                ip_address: ctx.ip_address.clone(),
                user_agent: ctx.user_agent.clone(),
            })
            .await;
        if let Err(e) = recorded {
            rollback_quietly(tx).await;
            return Err(e);
        }
        tx.commit().await?;

        let (action, verb) = match disposition {
            Disposition::Attachment => (AuditAction::FileDownload, "Downloaded"),
            Disposition::Inline => (AuditAction::FileView, "Viewed"),
        };
        self.audit
            .record_for(ctx, action, format!("{} file: {}", verb, file.title))
            .await;

        Ok(FileDownload { file, data })
    }

    async fn find_active(&self, file_id: Uuid) -> Result<PayrollFile> {
        self.store
            .find_file(file_id)
            .await?
            .filter(|f| f.is_active)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }
}
