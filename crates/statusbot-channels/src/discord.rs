//! Discord bot channel — posts messages through the REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use statusbot_core::error::{Result, StatusBotError};
use statusbot_core::traits::DeliverySink;
use statusbot_core::types::RenderedReport;

/// Embed description limit.
pub const EMBED_LIMIT: usize = 4096;
/// Plain message content limit.
pub const CONTENT_LIMIT: usize = 2000;

/// Discord channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".into()
}

impl DiscordConfig {
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot_token: bot_token.to_string(),
            api_base: default_api_base(),
        }
    }
}

/// Error body returned by the Discord API.
#[derive(Debug, Deserialize)]
struct DiscordApiError {
    #[serde(default)]
    code: Option<u64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: String,
}

pub struct DiscordChannel {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!(
            "{}/channels/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            channel_id
        )
    }

    /// POST one message. Returns the new message id.
    async fn post_message(&self, channel_id: &str, body: serde_json::Value) -> Result<String> {
        if self.config.bot_token.trim().is_empty() {
            return Err(StatusBotError::channel("BOT_TOKEN is not configured"));
        }

        let response = self
            .client
            .post(self.messages_url(channel_id))
            .header("Authorization", format!("Bot {}", self.config.bot_token))
            .json(&body)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| StatusBotError::Http(format!("Discord request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<DiscordApiError>(&text) {
                Ok(api) => StatusBotError::Channel {
                    code: api.code,
                    message: format!("{status}: {}", api.message),
                },
                Err(_) => StatusBotError::channel(format!("Discord API error {status}: {text}")),
            });
        }

        let message: DiscordMessage = response
            .json()
            .await
            .map_err(|e| StatusBotError::channel(format!("Invalid Discord response: {e}")))?;
        Ok(message.id)
    }
}

#[async_trait]
impl DeliverySink for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn deliver(&self, destination: &str, report: &RenderedReport) -> Result<()> {
        let chunks = split_message(&report.content, EMBED_LIMIT);
        let total = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            self.post_message(
                destination,
                serde_json::json!({
                    "embeds": [{
                        "description": chunk,
                        "color": report.accent.color(),
                    }]
                }),
            )
            .await?;
            tracing::debug!("📨 Discord embed {}/{} sent to {}", i + 1, total, destination);
        }
        Ok(())
    }

    async fn send_text(&self, destination: &str, text: &str) -> Result<Option<String>> {
        let mut first_id = None;
        for chunk in split_message(text, CONTENT_LIMIT) {
            let id = self
                .post_message(destination, serde_json::json!({ "content": chunk }))
                .await?;
            first_id.get_or_insert(id);
        }
        Ok(first_id)
    }
}

/// Split text into chunks of at most `limit` chars, preferring line breaks.
/// Lines longer than `limit` are hard-split.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let mut line: Vec<char> = line.chars().collect();
        let sep = usize::from(current_len > 0);
        if current_len + sep + line.len() <= limit {
            if sep == 1 {
                current.push('\n');
            }
            current.extend(line.iter());
            current_len += sep + line.len();
            continue;
        }
        if current_len > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        while line.len() > limit {
            let rest = line.split_off(limit);
            chunks.push(line.into_iter().collect());
            line = rest;
        }
        current_len = line.len();
        current = line.into_iter().collect();
    }

    if current_len > 0 || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_single_chunk() {
        assert_eq!(split_message("a\nb", 10), vec!["a\nb".to_string()]);
        assert_eq!(split_message("", 10), vec![String::new()]);
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc", 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn test_long_line_hard_split() {
        let chunks = split_message("abcdefghij\nxy", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij", "xy"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
    }

    #[test]
    fn test_multibyte_counts_chars() {
        let text = "📊📊📊\n✅✅";
        let chunks = split_message(text, 3);
        assert_eq!(chunks, vec!["📊📊📊", "✅✅"]);
    }

    #[test]
    fn test_messages_url() {
        let ch = DiscordChannel::new(DiscordConfig {
            bot_token: "t".into(),
            api_base: "http://localhost/api/".into(),
        });
        assert_eq!(ch.messages_url("42"), "http://localhost/api/channels/42/messages");
    }
}
