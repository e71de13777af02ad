//! Record fetcher for the Supabase REST (PostgREST) API.

use async_trait::async_trait;
use statusbot_core::config::SourceConfig;
use statusbot_core::error::{Result, StatusBotError};
use statusbot_core::traits::RecordSource;
use statusbot_core::types::Record;

/// Embedded relation selected alongside each record.
const SELECT: &str = "*,whatsapp_instances(status,telefone)";
const ORDER: &str = "created_at.desc";

/// Fetches the record table over HTTP. One request per call, no retries.
pub struct SupabaseFetcher {
    client: reqwest::Client,
    base_url: String,
    table: String,
    api_key: Option<String>,
}

impl SupabaseFetcher {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl RecordSource for SupabaseFetcher {
    async fn fetch(&self) -> Result<Vec<Record>> {
        let Some(key) = &self.api_key else {
            return Err(StatusBotError::MisconfiguredCredential(
                "SUPABASE_KEY is not set".into(),
            ));
        };

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("select", SELECT), ("order", ORDER)])
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StatusBotError::DataUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(300).collect();
            return Err(StatusBotError::DataUnavailable(if body.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {body}")
            }));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StatusBotError::DataUnavailable(format!("invalid JSON body: {e}")))?;

        let serde_json::Value::Array(rows) = payload else {
            tracing::warn!("⚠️ Record source returned a non-array body, treating as empty");
            return Ok(Vec::new());
        };

        let records: Vec<Record> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(i, row)| match serde_json::from_value::<Record>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping malformed record at position {i}: {e}");
                    None
                }
            })
            .collect();

        tracing::debug!("📥 Fetched {} records from {}", records.len(), self.table);
        Ok(records)
    }
}
