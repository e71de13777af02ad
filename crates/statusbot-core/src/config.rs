//! StatusBot configuration system.
//!
//! Loaded from `~/.statusbot/config.toml` when present, then overridden by
//! environment variables (`BOT_TOKEN`, `SUPABASE_KEY`, `STATUS_CHANNEL_ID`, ...).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StatusBotError};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBotConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl StatusBotConfig {
    /// Load config from the default path (~/.statusbot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StatusBotError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| StatusBotError::Config(format!("Failed to parse config: {e}")))
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".statusbot")
            .join("config.toml")
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("BOT_TOKEN") {
            self.delivery.bot_token = Some(v);
        }
        if let Some(v) = get("STATUS_CHANNEL_ID") {
            self.delivery.channel_id = Some(v);
        }
        if let Some(v) = get("STATUS_WEBHOOK_URL") {
            self.delivery.webhook_url = Some(v);
        }
        if let Some(v) = get("SUPABASE_URL") {
            self.source.base_url = v;
        }
        if let Some(v) = get("SUPABASE_KEY") {
            self.source.api_key = Some(v);
        }
        if let Some(v) = get("STATUS_SEND_HOUR") {
            self.schedule.hour = parse_env("STATUS_SEND_HOUR", &v)?;
        }
        if let Some(v) = get("STATUS_SEND_MINUTE") {
            self.schedule.minute = parse_env("STATUS_SEND_MINUTE", &v)?;
        }
        if let Some(v) = get("STATUS_TIMEZONE") {
            self.schedule.timezone = v;
        }
        if let Some(v) = get("SERVER_PORT") {
            self.gateway.port = parse_env("SERVER_PORT", &v)?;
        }
        Ok(())
    }

    /// Check value ranges. Missing credentials and channels are valid states.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.hour > 23 {
            return Err(StatusBotError::Config(format!(
                "schedule.hour must be 0-23, got {}",
                self.schedule.hour
            )));
        }
        if self.schedule.minute > 59 {
            return Err(StatusBotError::Config(format!(
                "schedule.minute must be 0-59, got {}",
                self.schedule.minute
            )));
        }
        if self.schedule.poll_interval_secs == 0 {
            return Err(StatusBotError::Config(
                "schedule.poll_interval_secs must be positive".into(),
            ));
        }
        self.schedule.tz()?;
        Ok(())
    }

    /// Destination handle for the recurring report, if one is configured.
    pub fn destination(&self) -> Option<&str> {
        match self.delivery.target {
            DeliveryTarget::Discord => self.delivery.channel_id.as_deref(),
            DeliveryTarget::Webhook => self.delivery.webhook_url.as_deref(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| StatusBotError::Config(format!("{key} has an invalid value: '{value}'")))
}

/// When the daily report fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_hour")]
    pub hour: u32,
    #[serde(default = "default_minute")]
    pub minute: u32,
    /// IANA time zone name.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_hour() -> u32 { 18 }
fn default_minute() -> u32 { 40 }
fn default_timezone() -> String { "America/Sao_Paulo".into() }
fn default_poll_interval() -> u64 { 60 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: default_hour(),
            minute: default_minute(),
            timezone: default_timezone(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl ScheduleConfig {
    /// Resolve the configured zone name.
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| StatusBotError::Config(format!("Unknown time zone: '{}'", self.timezone)))
    }
}

/// Remote record source (Supabase REST).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Optional; its absence is reported to the operator, not a crash.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String { "http://127.0.0.1:54321".into() }
fn default_table() -> String { "usuarios".into() }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            table: default_table(),
            api_key: None,
        }
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Category tags that never appear in a report.
    #[serde(default = "default_excluded")]
    pub excluded_categories: Vec<String>,
    #[serde(default = "default_standard")]
    pub standard_category: String,
}

fn default_excluded() -> Vec<String> { vec!["administracao".into()] }
fn default_standard() -> String { "cliente".into() }

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            excluded_categories: default_excluded(),
            standard_category: default_standard(),
        }
    }
}

/// Which sink carries the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryTarget {
    #[default]
    Discord,
    Webhook,
}

/// Delivery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub target: DeliveryTarget,
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Absence disables the recurring report only.
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// HTTP admin endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3000 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = StatusBotConfig::default();
        assert_eq!(cfg.schedule.hour, 18);
        assert_eq!(cfg.schedule.minute, 40);
        assert_eq!(cfg.schedule.tz().unwrap(), chrono_tz::America::Sao_Paulo);
        assert_eq!(cfg.report.excluded_categories, vec!["administracao".to_string()]);
        assert!(cfg.source.api_key.is_none());
        assert!(cfg.destination().is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_toml() {
        let cfg = StatusBotConfig::from_toml(
            r#"
            [schedule]
            hour = 9

            [report]
            excluded_categories = ["administracao", "interno"]

            [delivery]
            target = "webhook"
            webhook_url = "https://example.com/hook"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.schedule.hour, 9);
        assert_eq!(cfg.schedule.minute, 40);
        assert_eq!(cfg.report.excluded_categories.len(), 2);
        assert_eq!(cfg.destination(), Some("https://example.com/hook"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STATUS_SEND_HOUR", "7"),
            ("STATUS_SEND_MINUTE", " 5 "),
            ("STATUS_CHANNEL_ID", "1234"),
            ("SUPABASE_KEY", ""),
        ]);
        let mut cfg = StatusBotConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.schedule.hour, 7);
        assert_eq!(cfg.schedule.minute, 5);
        assert_eq!(cfg.destination(), Some("1234"));
        assert!(cfg.source.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut cfg = StatusBotConfig::default();
        let err = cfg
            .apply_overrides(|k| (k == "STATUS_SEND_HOUR").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, StatusBotError::Config(_)));

        cfg.schedule.minute = 60;
        assert!(cfg.validate().is_err());

        let mut cfg = StatusBotConfig::default();
        cfg.schedule.timezone = "Mars/Olympus".into();
        assert!(cfg.validate().is_err());
    }
}
