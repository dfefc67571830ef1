use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::audit::{dtos as audit_dtos, handlers as audit_handlers, models as audit_models};
use crate::features::auth;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::notifications::{
    dtos as notification_dtos, handlers as notification_handlers, models as notification_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::login,
        auth::handler::logout,
        auth::handler::get_me,
        auth::handler::get_csrf_token,
        // Files (readers)
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::download_file,
        // Files (admin)
        files_handlers::upload_files,
        files_handlers::admin_list_files,
        files_handlers::delete_file,
        // Access
        files_handlers::list_file_access,
        files_handlers::grant_access,
        files_handlers::revoke_access,
        files_handlers::grant_access_all,
        files_handlers::revoke_access_all,
        // Users
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::list_active_users,
        users_handlers::update_user_status,
        users_handlers::reset_password,
        // Mail
        notification_handlers::send_test_email,
        // Activity logs
        audit_handlers::list_logs,
        audit_handlers::get_log_stats,
        audit_handlers::cleanup_logs,
    ),
    components(
        schemas(
            // Shared
            Meta,
            notification_models::NotificationSummary,
            // Auth
            auth::dto::LoginRequestDto,
            auth::dto::LoginResponseDto,
            ApiResponse<auth::dto::LoginResponseDto>,
            auth::dto::MeResponseDto,
            auth::dto::CsrfTokenDto,
            auth::model::AuthenticatedUser,
            ApiResponse<auth::dto::MeResponseDto>,
            ApiResponse<auth::dto::CsrfTokenDto>,
            // Files
            files_dtos::UploadPayrollFilesDto,
            files_dtos::FileResponseDto,
            files_dtos::AdminFileResponseDto,
            files_dtos::UploadOutcomeDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<Vec<files_dtos::AdminFileResponseDto>>,
            ApiResponse<files_dtos::UploadOutcomeDto>,
            // Access
            files_dtos::UserSelectionDto,
            files_dtos::GrantOutcomeDto,
            files_dtos::RevokeOutcomeDto,
            ApiResponse<files_dtos::GrantOutcomeDto>,
            ApiResponse<files_dtos::RevokeOutcomeDto>,
            // Users
            users_models::UserRole,
            users_dtos::UserResponseDto,
            users_dtos::UserOverviewDto,
            users_dtos::UpdateUserStatusDto,
            users_dtos::CreateUserDto,
            users_dtos::ResetPasswordDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            ApiResponse<Vec<users_dtos::UserOverviewDto>>,
            // Mail
            notification_dtos::TestEmailDto,
            notification_dtos::TestEmailResponseDto,
            ApiResponse<notification_dtos::TestEmailResponseDto>,
            // Activity logs
            audit_models::AuditAction,
            audit_dtos::AuditEntryResponseDto,
            audit_dtos::AuditStatsResponseDto,
            audit_dtos::CleanupLogsDto,
            audit_dtos::CleanupLogsResponseDto,
            ApiResponse<Vec<audit_dtos::AuditEntryResponseDto>>,
            ApiResponse<audit_dtos::AuditStatsResponseDto>,
            ApiResponse<audit_dtos::CleanupLogsResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Sign-in, session identity and CSRF tokens"),
        (name = "files", description = "Payroll file upload, listing, download and deletion"),
        (name = "access", description = "Per-user read grants (admin only)"),
        (name = "users", description = "User directory and credentials (admin only)"),
        (name = "notifications", description = "Mail delivery check (admin only)"),
        (name = "audit", description = "Activity log query and retention (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Payroll Portal API",
        version = "0.1.0",
        description = "API documentation for the payroll document portal",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
