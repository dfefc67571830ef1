use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{User, UserOverview, UserRole};

/// Response DTO for a portal user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub employee_id: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            employee_id: user.employee_id,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Admin overview row with access and download counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserOverviewDto {
    #[serde(flatten)]
    pub user: UserResponseDto,
    pub accessible_files: i64,
    pub total_downloads: i64,
    pub last_activity: Option<DateTime<Utc>>,
}

impl From<UserOverview> for UserOverviewDto {
    fn from(row: UserOverview) -> Self {
        Self {
            user: UserResponseDto {
                id: row.id,
                username: row.username,
                email: row.email,
                full_name: row.full_name,
                employee_id: row.employee_id,
                role: row.role,
                is_active: row.is_active,
                created_at: row.created_at,
            },
            accessible_files: row.accessible_files,
            total_downloads: row.total_downloads,
            last_activity: row.last_activity,
        }
    }
}

/// Request DTO for activating or deactivating a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserStatusDto {
    pub is_active: bool,
}

/// Request DTO for creating a portal account
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: String,

    #[validate(length(max = 50, message = "Employee ID must be at most 50 characters"))]
    pub employee_id: Option<String>,

    #[serde(default)]
    pub role: UserRole,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

impl CreateUserDto {
    /// Trimmed copy; a blank employee id becomes `None`
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            employee_id: self
                .employee_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            role: self.role,
            password: self.password,
        }
    }
}

/// Request DTO for an admin password reset
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordDto {
    pub new_password: String,
}
