use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::MailConfig;

/// Outbound email seam. The reset flow calls this fire-and-forget: delivery
/// failures are logged by the caller and never surfaced to the user.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Posts messages to an HTTP mail API (Mailgun-style JSON endpoint).
pub struct HttpMailer {
    http: Client,
    endpoint: String,
    api_token: String,
    from: String,
}

impl HttpMailer {
    pub fn from_config(cfg: &MailConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent("timetrack/mailer")
            .build()
            .context("build mail http client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_token: cfg.api_token.clone(),
            from: cfg.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, text: &str) -> anyhow::Result<()> {
        let message = OutboundMessage {
            from: &self.from,
            to,
            subject,
            text,
        };
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&message)
            .send()
            .await
            .context("post to mail endpoint")?;
        anyhow::ensure!(
            resp.status().is_success(),
            "mail endpoint returned {}",
            resp.status()
        );
        debug!(to = %to, subject = %subject, "mail accepted");
        Ok(())
    }
}
