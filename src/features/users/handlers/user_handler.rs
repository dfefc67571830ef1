use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::RequestContext;
use crate::features::users::dtos::{
    CreateUserDto, ResetPasswordDto, UpdateUserStatusDto, UserOverviewDto, UserResponseDto,
};
use crate::features::users::services::UserDirectory;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users with access counters", body = ApiResponse<Vec<UserOverviewDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    State(directory): State<Arc<UserDirectory>>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<Vec<UserOverviewDto>>>> {
    let users: Vec<UserOverviewDto> = directory
        .list_users(&ctx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let meta = Meta::total(users.len() as i64);

    Ok(Json(ApiResponse::success(Some(users), None, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/active",
    responses(
        (status = 200, description = "Active regular users that can receive grants", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_active_users(
    State(directory): State<Arc<UserDirectory>>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let users: Vec<UserResponseDto> = directory
        .list_active_regular_users(&ctx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ApiResponse::success(Some(users), None, None)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/status",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserStatusDto,
    responses(
        (status = 200, description = "User status updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Cannot deactivate own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user_status(
    State(directory): State<Arc<UserDirectory>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateUserStatusDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = directory.set_active(&ctx, id, dto.is_active).await?;
    let message = if user.is_active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };

    Ok(Json(ApiResponse::success(
        Some(user.into()),
        Some(message.to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Missing fields, short password or username/email taken"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user(
    State(directory): State<Arc<UserDirectory>>,
    ctx: RequestContext,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    let user = directory.create_user(&ctx, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user.into()),
            Some("User created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/password",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Password too short"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reset_password(
    State(directory): State<Arc<UserDirectory>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ResetPasswordDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = directory.reset_password(&ctx, id, dto.new_password).await?;

    Ok(Json(ApiResponse::success(
        Some(user.into()),
        Some("Password reset successfully".to_string()),
        None,
    )))
}
