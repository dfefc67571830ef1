use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::RequestContext;
use crate::features::files::dtos::{AdminFileResponseDto, DownloadQuery, FileResponseDto};
use crate::features::files::models::Disposition;
use crate::features::files::services::FileService;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Files the caller may read", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let files: Vec<FileResponseDto> = service
        .list_accessible(&ctx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let meta = Meta::total(files.len() as i64);

    Ok(Json(ApiResponse::success(Some(files), None, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/files/{id}",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata", body = ApiResponse<FileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No access to this file"),
        (status = 404, description = "File not found")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    State(service): State<Arc<FileService>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.get_file(&ctx, id).await?;

    Ok(Json(ApiResponse::success(Some(file.into()), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    params(
        ("id" = Uuid, Path, description = "File ID"),
        DownloadQuery
    ),
    responses(
        (status = 200, description = "File bytes", content_type = "application/pdf"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No access to this file"),
        (status = 404, description = "File not found")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_file(
    State(service): State<Arc<FileService>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let disposition = query.disposition();
    let download = service.download(&ctx, id, disposition).await?;

    let headers = [
        (header::CONTENT_TYPE, download.file.mime_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(disposition, &download.file.original_filename),
        ),
        (header::CONTENT_LENGTH, download.data.len().to_string()),
        (header::CACHE_CONTROL, "private, no-store".to_string()),
    ];

    Ok((headers, download.data).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/files",
    responses(
        (status = 200, description = "Active files with grantees", body = ApiResponse<Vec<AdminFileResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_list_files(
    State(service): State<Arc<FileService>>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<Vec<AdminFileResponseDto>>>> {
    let files: Vec<AdminFileResponseDto> = service
        .list_all(&ctx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let meta = Meta::total(files.len() as i64);

    Ok(Json(ApiResponse::success(Some(files), None, Some(meta))))
}

#[utoipa::path(
    delete,
    path = "/api/admin/files/{id}",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted and all access revoked", body = ApiResponse<FileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required"),
        (status = 404, description = "File not found")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.soft_delete(&ctx, id).await?;

    Ok(Json(ApiResponse::success(
        Some(file.into()),
        Some("File deleted successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/files/{id}/access",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Users holding a grant", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "File not found")
    ),
    tag = "access",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_file_access(
    State(service): State<Arc<FileService>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let users: Vec<UserResponseDto> = service
        .grantees(&ctx, id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ApiResponse::success(Some(users), None, None)))
}

/// Header value with a filename reduced to safe ASCII
fn content_disposition(disposition: Disposition, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' | ' ' => c,
            _ => '_',
        })
        .collect();
    let safe = safe.trim();
    let safe = if safe.is_empty() { "download" } else { safe };

    format!("{}; filename=\"{}\"", disposition.as_header_value(), safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_sanitizes_filename() {
        assert_eq!(
            content_disposition(Disposition::Attachment, "march.pdf"),
            "attachment; filename=\"march.pdf\""
        );
        assert_eq!(
            content_disposition(Disposition::Inline, "a\"b\r\n.pdf"),
            "inline; filename=\"a_b__.pdf\""
        );
        assert_eq!(
            content_disposition(Disposition::Attachment, "\u{00e9}"),
            "attachment; filename=\"_\""
        );
        assert_eq!(
            content_disposition(Disposition::Attachment, "  "),
            "attachment; filename=\"download\""
        );
    }
}
