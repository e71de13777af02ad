//! Error taxonomy shared by every StatusBot crate.

use thiserror::Error;

/// Errors surfaced by the report pipeline, the trigger and the delivery sinks.
#[derive(Debug, Error)]
pub enum StatusBotError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The data-source access key is absent. Never retried.
    #[error("Data source credential is not configured: {0}")]
    MisconfiguredCredential(String),

    /// Network failure or non-2xx response from the record source. Never retried.
    #[error("Record data unavailable: {0}")]
    DataUnavailable(String),

    /// Delivery to the operator channel failed. Logged, never propagated to the trigger loop.
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    /// Channel-level API error carrying the platform's own error code when known.
    #[error("Channel error{}: {message}", code_suffix(.code))]
    Channel { code: Option<u64>, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StatusBotError {
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            code: None,
            message: message.into(),
        }
    }

    /// Remediation hint shown to the operator next to the raw error text.
    pub fn operator_hint(&self) -> Option<&'static str> {
        match self {
            Self::MisconfiguredCredential(_) => Some(
                "Add `SUPABASE_KEY` to the environment (or `source.api_key` to config.toml) with the data source's API key.",
            ),
            Self::DataUnavailable(_) => Some(
                "Check that the key is the service-role secret, that the records table exists, and the bot logs for details.",
            ),
            _ => None,
        }
    }
}

fn code_suffix(code: &Option<u64>) -> String {
    code.map(|c| format!(" {c}")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, StatusBotError>;
