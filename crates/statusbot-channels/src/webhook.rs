//! Webhook sink — POSTs the report as JSON to the destination URL.
//! Discord webhook URLs get an embed payload, anything else a generic body.

use async_trait::async_trait;
use statusbot_core::error::{Result, StatusBotError};
use statusbot_core::traits::DeliverySink;
use statusbot_core::types::RenderedReport;

use crate::discord::{EMBED_LIMIT, split_message};

pub struct WebhookSink {
    client: reqwest::Client,
    headers: Vec<(String, String)>,
}

impl WebhookSink {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    async fn post(&self, url: &str, body: serde_json::Value) -> Result<()> {
        let mut req = self
            .client
            .post(url)
            .json(&body)
            .timeout(std::time::Duration::from_secs(10));
        for (key, value) in &self.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| StatusBotError::Http(format!("Webhook send failed: {e}")))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(StatusBotError::channel(format!("Webhook error {status}: {body}")))
        }
    }
}

impl Default for WebhookSink {
    fn default() -> Self {
        Self::new()
    }
}

fn is_discord_webhook(url: &str) -> bool {
    url.contains("/api/webhooks/")
}

#[async_trait]
impl DeliverySink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, destination: &str, report: &RenderedReport) -> Result<()> {
        if is_discord_webhook(destination) {
            for chunk in split_message(&report.content, EMBED_LIMIT) {
                self.post(
                    destination,
                    serde_json::json!({
                        "embeds": [{ "description": chunk, "color": report.accent.color() }]
                    }),
                )
                .await?;
            }
            Ok(())
        } else {
            self.post(destination, serde_json::to_value(report)?).await
        }
    }

    async fn send_text(&self, destination: &str, text: &str) -> Result<Option<String>> {
        let body = if is_discord_webhook(destination) {
            serde_json::json!({ "content": text })
        } else {
            serde_json::json!({ "text": text })
        };
        self.post(destination, body).await?;
        Ok(None)
    }
}
