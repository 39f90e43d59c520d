//! Mail delivery seam
//!
//! Mail leaves the platform through an HTTP relay. Delivery is
//! best-effort: callers log failures and carry on, a lost email never
//! fails the operation that triggered it.

use crate::config::MailConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Outbound message handed to the relay
#[derive(Debug, Serialize)]
pub struct OutboundMail<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub html_body: &'a str,
}

/// Mail delivery abstraction
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Attempt delivery of one message
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

/// Mailer that posts messages to an HTTP relay endpoint
pub struct RelayMailer {
    client: reqwest::Client,
    relay_url: String,
    sender: String,
}

impl RelayMailer {
    pub fn new(relay_url: String, sender: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            relay_url,
            sender,
        })
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let payload = OutboundMail {
            from: &self.sender,
            to,
            subject,
            html_body,
        };

        let response = self
            .client
            .post(&self.relay_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Mail {
                message: format!("Relay returned {}", response.status()),
            });
        }

        tracing::info!(to = %to, subject = %subject, "Mail accepted by relay");
        Ok(())
    }
}

/// Mailer used when no relay is configured; drops mail with a log line
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<()> {
        tracing::info!(to = %to, subject = %subject, "Mail delivery disabled, skipping");
        Ok(())
    }
}

/// Build the mailer implied by configuration
pub fn from_config(config: &MailConfig) -> Result<Box<dyn Mailer>> {
    match config.relay_url {
        Some(ref url) => Ok(Box::new(RelayMailer::new(
            url.clone(),
            config.sender.clone(),
            config.timeout_secs,
        )?)),
        None => Ok(Box::new(NoopMailer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;

    #[test]
    fn test_noop_mailer_always_succeeds() {
        let mailer = NoopMailer;
        use tokio_test::assert_ok;
        let sent = tokio_test::block_on(mailer.send("a@b.c", "Hi", "<p>Hi</p>"));
        assert_ok!(sent);
    }

    #[test]
    fn test_from_config_without_relay_is_noop() {
        let config = MailConfig {
            relay_url: None,
            sender: "Inkwell <noreply@example.com>".to_string(),
            timeout_secs: 10,
        };
        // No relay URL means mail is disabled, not an error
        assert!(from_config(&config).is_ok());
    }
}
