use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use shared_config::AppConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail API request failed: {0}")]
    Request(String),

    #[error("Mail API returned {0}: {1}")]
    Rejected(u16, String),
}

/// Outbound email seam. The sweep only knows this trait; tests swap in a
/// recording fake.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// Sends through an HTTP transactional-mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        debug!("Dispatching email to {}", to);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .map_err(|e| MailError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(status.as_u16(), body));
        }

        Ok(())
    }
}
