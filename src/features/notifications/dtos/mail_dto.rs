use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request DTO for a mail delivery check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestEmailDto {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestEmailResponseDto {
    pub email: String,
    /// Whether the mail relay accepted the message
    pub delivered: bool,
}
