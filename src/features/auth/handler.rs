use crate::core::error::Result;
use crate::core::extractor::{AppJson, CSRF_HEADER};
use crate::features::auth::dto::{CsrfTokenDto, LoginRequestDto, LoginResponseDto, MeResponseDto};
use crate::features::auth::model::{AuthenticatedUser, ClientInfo, RequestContext};
use crate::features::auth::service::AuthService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    client: ClientInfo,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    let outcome = service.login(&dto.username, &dto.password, client).await?;
    Ok(Json(ApiResponse::success(Some(outcome.into()), None, None)))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout recorded; discard the access token"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    State(service): State<Arc<AuthService>>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<()>>> {
    service.logout(&ctx).await;
    Ok(Json(ApiResponse::success(
        None,
        Some("Logged out".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<Json<ApiResponse<MeResponseDto>>> {
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/auth/csrf",
    responses(
        (status = 200, description = "CSRF token issued for the current session", body = ApiResponse<CsrfTokenDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_csrf_token(
    State(service): State<Arc<AuthService>>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<CsrfTokenDto>>> {
    let dto = CsrfTokenDto {
        csrf_token: service.issue_csrf_token(&ctx),
        header_name: CSRF_HEADER.to_string(),
    };
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}
