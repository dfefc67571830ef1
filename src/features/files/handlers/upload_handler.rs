use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::RequestContext;
use crate::features::files::dtos::{UploadOutcomeDto, UploadPayrollFilesDto};
use crate::features::files::models::{UploadRequest, UploadedFile};
use crate::features::files::services::UploadTransaction;
use crate::shared::types::ApiResponse;

/// Upload a batch of payroll files
///
/// Accepts multipart/form-data with:
/// - `files` (or `payroll_files`): one part per document (required)
/// - `title`: shared title (required)
/// - `description`, `pay_period`: optional shared metadata
/// - `selected_users`: one part per grantee id
/// - `csrf_token`: optional, overrides the `X-CSRF-Token` header
#[utoipa::path(
    post,
    path = "/api/admin/files/upload",
    tag = "files",
    request_body(
        content = UploadPayrollFilesDto,
        content_type = "multipart/form-data",
        description = "Payroll documents with shared metadata and initial grantees",
    ),
    responses(
        (status = 201, description = "Files uploaded", body = ApiResponse<UploadOutcomeDto>),
        (status = 400, description = "Invalid file or form field"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access and CSRF token required"),
        (status = 413, description = "Request too large"),
        (status = 500, description = "Storage failure, names the failed files")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_files(
    State(uploads): State<Arc<UploadTransaction>>,
    mut ctx: RequestContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadOutcomeDto>>)> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "files" | "files[]" | "payroll_files" | "payroll_files[]" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "unnamed".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read bytes of {}: {}", filename, e);
                    AppError::BadRequest(format!("Failed to read file {}: {}", filename, e))
                })?;
                request.files.push(UploadedFile {
                    filename,
                    data: data.to_vec(),
                });
            }
            "title" => request.title = text(field, "title").await?,
            "description" => request.description = Some(text(field, "description").await?),
            "pay_period" => request.pay_period = Some(text(field, "pay_period").await?),
            "selected_users" | "selected_users[]" => {
                let raw = text(field, "selected_users").await?;
                let user_id = Uuid::parse_str(raw.trim()).map_err(|_| {
                    AppError::BadRequest(format!("Invalid user id '{}'", raw))
                })?;
                request.grantee_ids.push(user_id);
            }
            "csrf_token" => {
                let token = text(field, "csrf_token").await?;
                if !token.is_empty() {
                    ctx = ctx.with_csrf_token(token);
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let outcome = uploads.upload(&ctx, request).await?;
    let message = outcome.message.clone();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(outcome.into()),
            Some(message),
            None,
        )),
    ))
}

async fn text(field: Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}
