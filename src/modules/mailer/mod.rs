//! Outbound mail transport
//!
//! Delivery is best-effort: `send` reports success as a boolean and never
//! returns an error, so callers can record the outcome without branching on
//! transport failures.

mod http_mailer;

pub use http_mailer::HttpMailTransport;

use async_trait::async_trait;
use tracing::warn;

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool;
}

/// Transport used when no mail relay is configured; every send fails
pub struct DisabledMailTransport;

#[async_trait]
impl MailTransport for DisabledMailTransport {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> bool {
        warn!(
            "Mail relay not configured, dropping message to {}: {}",
            to, subject
        );
        false
    }
}
