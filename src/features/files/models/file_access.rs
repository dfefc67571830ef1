use uuid::Uuid;

/// Outcome of an idempotent grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantResult {
    /// `false` when the pair was already granted
    pub created: bool,
}

/// Outcome of an idempotent revoke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeResult {
    /// `false` when no grant existed for the pair
    pub removed: bool,
}

/// Download record appended together with the file's counter increment
#[derive(Debug, Clone)]
pub struct NewDownloadLog {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
