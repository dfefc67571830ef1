use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::MailTransport;
use crate::core::config::MailConfig;
use crate::core::error::{AppError, Result};

/// Client for an HTTP mail relay accepting JSON messages
pub struct HttpMailTransport {
    http_client: Client,
    api_url: String,
    api_key: Option<String>,
    from_address: String,
    from_name: String,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpMailTransport {
    pub fn new(config: &MailConfig, api_url: String) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url,
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            from_name: config.system_name.clone(),
        })
    }

    fn from_header(&self) -> String {
        format!("\"{}\" <{}>", self.from_name, self.from_address)
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        let message = OutgoingMessage {
            from: self.from_header(),
            to,
            subject,
            html: html_body,
        };

        let mut request = self.http_client.post(&self.api_url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Mail relay accepted message to {}", to);
                true
            }
            Ok(response) => {
                warn!(
                    "Mail relay rejected message to {}: status {}",
                    to,
                    response.status()
                );
                false
            }
            Err(e) => {
                warn!("Failed to reach mail relay for {}: {}", to, e);
                false
            }
        }
    }
}
