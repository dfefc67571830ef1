use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::files::models::PayrollFile;

/// Batch metadata carried in a "new file available" notification
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub title: String,
    pub description: Option<String>,
    pub pay_period: Option<String>,
}

impl From<&PayrollFile> for FileInfo {
    fn from(file: &PayrollFile) -> Self {
        Self {
            title: file.title.clone(),
            description: file.description.clone(),
            pay_period: file.pay_period.clone(),
        }
    }
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub user_id: Uuid,
    pub email: String,
    pub success: bool,
}

/// Per-recipient delivery counts folded into response messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotificationSummary {
    pub sent: usize,
    pub failed: usize,
}

impl NotificationSummary {
    pub fn from_outcomes(outcomes: &[NotificationOutcome]) -> Self {
        let sent = outcomes.iter().filter(|o| o.success).count();
        Self {
            sent,
            failed: outcomes.len() - sent,
        }
    }

    /// Append the delivery outcome to a success message
    pub fn describe(&self, headline: &str) -> String {
        match (self.sent, self.failed) {
            (0, 0) => headline.to_string(),
            (sent, 0) => format!("{} Email notifications sent to {} user(s).", headline, sent),
            (0, _) => format!(
                "{} However, email notifications could not be sent.",
                headline
            ),
            (sent, failed) => format!(
                "{} Email notifications sent to {} user(s). {} email(s) failed to send.",
                headline, sent, failed
            ),
        }
    }
}
