use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::reminder::composer::ReminderPayload;

/// Internal transport failures. Logged, never shown to end users.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("mail relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("mail transport misconfigured: {0}")]
    Misconfigured(String),
}

/// Outbound mail delivery.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, payload: &ReminderPayload) -> Result<(), TransportError>;
}

/// Message body accepted by the mail relay.
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: String,
}

/// Sends reminders by POSTing JSON to a mail relay service.
pub struct HttpRelayTransport {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpRelayTransport {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl MailTransport for HttpRelayTransport {
    async fn send(&self, payload: &ReminderPayload) -> Result<(), TransportError> {
        let message = RelayMessage {
            from: &payload.from,
            to: &payload.to,
            subject: &payload.subject,
            html: payload.render_html(),
        };

        let mut request = self.client.post(&self.url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Mail relay accepted message for {}", payload.to);
        Ok(())
    }
}

/// Logs reminders instead of sending them.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, payload: &ReminderPayload) -> Result<(), TransportError> {
        info!(
            "DRY RUN: would send '{}' to {} ({} days remaining)",
            payload.subject, payload.to, payload.fields.days_remaining
        );
        Ok(())
    }
}

/// Build the transport described by `config`. `force_dry_run` overrides the
/// configured setting.
pub fn from_config(config: &MailConfig, force_dry_run: bool) -> Result<Box<dyn MailTransport>, TransportError> {
    if force_dry_run || config.dry_run {
        return Ok(Box::new(LogTransport));
    }

    let url = config
        .relay_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| TransportError::Misconfigured("mail.relay_url is not set".to_string()))?;

    Ok(Box::new(HttpRelayTransport::new(
        url,
        config.api_key.clone(),
        Duration::from_secs(config.timeout_secs),
    )?))
}
