use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::notify::Notifier;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    content: &'a str,
}

pub struct DiscordWebhook {
    client: Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .context("Failed to build webhook client")?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    async fn post(&self, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(&WebhookBody { content: text })
            .send()
            .await
            .context("Webhook request failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("Webhook returned {}", resp.status());
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(&self, text: &str) {
        if let Err(e) = self.post(text).await {
            debug!("Discord notify dropped: {:#}", e);
        }
    }
}
