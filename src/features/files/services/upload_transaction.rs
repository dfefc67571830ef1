use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::config::UploadConfig;
use crate::core::error::{AppError, Result};
use crate::core::store::{rollback_quietly, PortalStore, StoreTx};
use crate::features::audit::models::AuditAction;
use crate::features::audit::AuditLog;
use crate::features::auth::{RequestContext, RequestGuard};
use crate::features::files::models::{NewPayrollFile, UploadOutcome, UploadRequest, UploadedFile};
use crate::features::files::services::AccessController;
use crate::features::notifications::models::{FileInfo, NotificationSummary};
use crate::features::notifications::NotificationDispatcher;
use crate::features::users::models::User;
use crate::modules::storage::BlobStorage;
use crate::shared::constants::{OCTET_STREAM_MIME_TYPE, PDF_MIME_TYPE, STORED_FILE_PREFIX};
use crate::shared::validation::{file_extension, PAY_PERIOD_REGEX};

use super::access_controller::dedupe;

/// A file that passed pre-flight checks
struct ValidatedFile<'a> {
    source: &'a UploadedFile,
    extension: String,
}

/// Multi-file ingestion as one unit of work
///
/// Bytes are written first under fresh names, rows and grants go into one
/// database transaction, and any failure before commit deletes every object
/// written for the batch. Nothing is visible to readers until commit.
pub struct UploadTransaction {
    store: Arc<dyn PortalStore>,
    storage: Arc<dyn BlobStorage>,
    access: Arc<AccessController>,
    audit: Arc<AuditLog>,
    notifier: Arc<NotificationDispatcher>,
    guard: Arc<RequestGuard>,
    config: UploadConfig,
}

impl UploadTransaction {
    pub fn new(
        store: Arc<dyn PortalStore>,
        storage: Arc<dyn BlobStorage>,
        access: Arc<AccessController>,
        audit: Arc<AuditLog>,
        notifier: Arc<NotificationDispatcher>,
        guard: Arc<RequestGuard>,
        config: UploadConfig,
    ) -> Self {
        Self {
            store,
            storage,
            access,
            audit,
            notifier,
            guard,
            config,
        }
    }

    pub async fn upload(&self, ctx: &RequestContext, request: UploadRequest) -> Result<UploadOutcome> {
        self.guard.require_admin_mutation(ctx)?;
        let validated = self.preflight(&request)?;
        let grantee_ids = dedupe(&request.grantee_ids);

        let mut tx = self.store.begin().await?;
        let mut written: Vec<String> = Vec::with_capacity(validated.len());

        let applied = self
            .write_batch(tx.as_mut(), ctx, &request, &validated, &grantee_ids, &mut written)
            .await;

        let (file_ids, newly_granted) = match applied {
            Ok(applied) => applied,
            Err(e) => {
                rollback_quietly(tx).await;
                self.discard(&written).await;
                return Err(e);
            }
        };

        if let Err(e) = tx.commit().await {
            tracing::error!("Upload commit failed for '{}': {}", request.title, e);
            self.discard(&written).await;
            return Err(e);
        }

        let file_count = file_ids.len();
        tracing::info!(
            "Uploaded {} payroll file(s) '{}' with {} grantee(s)",
            file_count,
            request.title,
            grantee_ids.len()
        );
        self.audit
            .record_for(
                ctx,
                AuditAction::FileUpload,
                format!("Uploaded {} payroll files: {}", file_count, request.title),
            )
            .await;

        let notifications = self.notify(ctx, &request, &newly_granted).await;
        let headline = format!("{} payroll file(s) uploaded successfully!", file_count);

        Ok(UploadOutcome {
            file_ids,
            notifications,
            message: notifications.describe(&headline),
        })
    }

    /// Reject the whole batch before any I/O if one file or field is invalid
    fn preflight<'a>(&self, request: &'a UploadRequest) -> Result<Vec<ValidatedFile<'a>>> {
        if request.title.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter a title for the payroll files".to_string(),
            ));
        }

        if let Some(period) = request.pay_period.as_deref() {
            if !period.is_empty() && !PAY_PERIOD_REGEX.is_match(period) {
                return Err(AppError::Validation(format!(
                    "Invalid pay period '{}'",
                    period
                )));
            }
        }

        if request.files.is_empty() {
            return Err(AppError::Validation(
                "Please select at least one file to upload".to_string(),
            ));
        }

        request
            .files
            .iter()
            .map(|file| {
                if file.data.is_empty() {
                    return Err(AppError::Validation(format!(
                        "File {} is empty",
                        file.filename
                    )));
                }

                if file.data.len() > self.config.max_file_size {
                    return Err(AppError::Validation(format!(
                        "File size exceeds the maximum allowed size for {} ({} bytes)",
                        file.filename, self.config.max_file_size
                    )));
                }

                let extension = file_extension(&file.filename)
                    .filter(|ext| self.config.allowed_extensions.contains(ext))
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "Only {} files are allowed. Invalid file: {}",
                            self.config.allowed_extensions.join(", ").to_uppercase(),
                            file.filename
                        ))
                    })?;

                Ok(ValidatedFile {
                    source: file,
                    extension,
                })
            })
            .collect()
    }

    /// Storage writes, row inserts and grants; `written` tracks what to compensate
    async fn write_batch(
        &self,
        tx: &mut dyn StoreTx,
        ctx: &RequestContext,
        request: &UploadRequest,
        files: &[ValidatedFile<'_>],
        grantee_ids: &[Uuid],
        written: &mut Vec<String>,
    ) -> Result<(Vec<Uuid>, Vec<Uuid>)> {
        let mut file_ids = Vec::with_capacity(files.len());

        for file in files {
            let stored_path = format!("{}{}.{}", STORED_FILE_PREFIX, Uuid::now_v7(), file.extension);
            let mime_type = mime_type_for(&file.extension);

            if let Err(e) = self
                .storage
                .write(&stored_path, &file.source.data, mime_type)
                .await
            {
                tracing::error!("Failed to store {}: {}", file.source.filename, e);
                return Err(AppError::Storage {
                    message: format!("Failed to upload some files: {}", file.source.filename),
                    failed_files: vec![file.source.filename.clone()],
                });
            }
            written.push(stored_path.clone());
            tracing::debug!("Stored {} as {}", file.source.filename, stored_path);

            let row = tx
                .insert_file(&NewPayrollFile {
                    title: request.title.trim().to_string(),
                    description: non_blank(request.description.as_deref()),
                    original_filename: file.source.filename.clone(),
                    stored_path,
                    size_bytes: file.source.data.len() as i64,
                    mime_type: mime_type.to_string(),
                    pay_period: non_blank(request.pay_period.as_deref()),
                    uploaded_by: ctx.user_id(),
                })
                .await?;
            file_ids.push(row.id);
        }

        let mut newly_granted = Vec::new();
        let mut seen = HashSet::new();
        for &file_id in &file_ids {
            for &user_id in grantee_ids {
                let result = self.access.grant(tx, file_id, user_id, ctx.user_id()).await?;
                if result.created && seen.insert(user_id) {
                    newly_granted.push(user_id);
                }
            }
        }

        Ok((file_ids, newly_granted))
    }

    /// Compensating delete for every object written by an aborted batch
    async fn discard(&self, written: &[String]) {
        for key in written {
            if let Err(e) = self.storage.delete(key).await {
                tracing::error!("Failed to remove orphaned upload {}: {}", key, e);
            }
        }
        if !written.is_empty() {
            tracing::warn!("Upload aborted, removed {} stored file(s)", written.len());
        }
    }

    /// One notification per newly granted user for the whole batch
    async fn notify(
        &self,
        ctx: &RequestContext,
        request: &UploadRequest,
        user_ids: &[Uuid],
    ) -> NotificationSummary {
        let mut users: Vec<User> = Vec::with_capacity(user_ids.len());
        for &user_id in user_ids {
            match self.store.find_user(user_id).await {
                Ok(Some(user)) if user.is_active => users.push(user),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping notification for {}: {}", user_id, e),
            }
        }

        let file_info = FileInfo {
            title: request.title.trim().to_string(),
            description: non_blank(request.description.as_deref()),
            pay_period: non_blank(request.pay_period.as_deref()),
        };
        let outcomes = self
            .notifier
            .notify_grant(ctx, &users, &file_info, &ctx.user.full_name)
            .await;
        NotificationSummary::from_outcomes(&outcomes)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn mime_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => PDF_MIME_TYPE,
        _ => OCTET_STREAM_MIME_TYPE,
    }
}
