use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::RequestContext;
use crate::features::notifications::dtos::{TestEmailDto, TestEmailResponseDto};
use crate::features::notifications::services::NotificationDispatcher;
use crate::shared::types::ApiResponse;

#[utoipa::path(
    post,
    path = "/api/admin/mail/test",
    request_body = TestEmailDto,
    responses(
        (status = 200, description = "Delivery attempted; `delivered` reports the relay outcome", body = ApiResponse<TestEmailResponseDto>),
        (status = 400, description = "Missing or invalid email address"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required")
    ),
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_test_email(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    ctx: RequestContext,
    AppJson(dto): AppJson<TestEmailDto>,
) -> Result<Json<ApiResponse<TestEmailResponseDto>>> {
    let email = dto.email.trim().to_string();
    let delivered = dispatcher.send_test_email(&ctx, &email).await?;

    let message = if delivered {
        format!("Test email sent successfully to {}", email)
    } else {
        format!(
            "Failed to send test email to {}. Please check the mail configuration.",
            email
        )
    };

    Ok(Json(ApiResponse::success(
        Some(TestEmailResponseDto { email, delivered }),
        Some(message),
        None,
    )))
}
