//! Record data model, as returned by the record source.
//!
//! Wire names follow the `usuarios` table of the data store
//! (`nome`, `fase`, `tipo`, `ativo`, `tipo_marcacao`, `whatsapp_instances`).

use serde::{Deserialize, Deserializer, Serialize};

/// One subject in the external store.
///
/// Decoding never fails on a mistyped column: labels accept strings,
/// numbers and booleans, anything else reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_label")]
    pub id: Option<String>,
    /// Display name.
    #[serde(rename = "nome", default, deserialize_with = "lenient_label")]
    pub name: Option<String>,
    /// Lifecycle phase label.
    #[serde(rename = "fase", default, deserialize_with = "lenient_label")]
    pub phase: Option<String>,
    /// Category tag (privileged or standard).
    #[serde(rename = "tipo", default, deserialize_with = "lenient_label")]
    pub category: Option<String>,
    /// Active flag. `None` when the column is null or not a boolean.
    #[serde(rename = "ativo", default, deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
    /// Marking/tag label.
    #[serde(rename = "tipo_marcacao", default, deserialize_with = "lenient_label")]
    pub marking: Option<String>,
    /// Zero-or-one linked connection. Absence means "no linked connection".
    #[serde(
        rename = "whatsapp_instances",
        default,
        deserialize_with = "first_connection"
    )]
    pub connection: Option<ConnectionStatus>,
}

/// State of a record's linked connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connected,
    Connecting,
    Disconnected,
    Error,
    /// Unrecognized value, kept verbatim.
    Other(String),
}

impl ConnectionState {
    /// Parse a wire label. Blank labels mean `Disconnected`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "conectado" => Self::Connected,
            "conectando" => Self::Connecting,
            "desconectado" | "" => Self::Disconnected,
            "erro" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    /// The label as stored in the data source.
    pub fn wire_label(&self) -> &str {
        match self {
            Self::Connected => "conectado",
            Self::Connecting => "conectando",
            Self::Disconnected => "desconectado",
            Self::Error => "erro",
            Self::Other(raw) => raw,
        }
    }
}

/// Embedded connection sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ConnectionWire")]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Associated contact identifier (phone number).
    pub contact: Option<String>,
}

impl ConnectionStatus {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state,
            contact: None,
        }
    }
}

#[derive(Deserialize)]
struct ConnectionWire {
    #[serde(default, deserialize_with = "lenient_label")]
    status: Option<String>,
    #[serde(rename = "telefone", default, deserialize_with = "lenient_label")]
    contact: Option<String>,
}

impl From<ConnectionWire> for ConnectionStatus {
    fn from(wire: ConnectionWire) -> Self {
        Self {
            state: ConnectionState::parse(wire.status.as_deref().unwrap_or_default()),
            contact: wire.contact,
        }
    }
}

/// The embedded relation comes back as an array (one-to-many), a single
/// object (one-to-one) or null. Only the first instance is meaningful;
/// anything that is not an object reads as no connection.
fn first_connection<'de, D>(deserializer: D) -> Result<Option<ConnectionStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let first = match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(list)) => list.into_iter().next(),
        other => other,
    };
    Ok(first
        .filter(serde_json::Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(v @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => Some(v.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?.and_then(|v| v.as_bool()))
}

/// Visual accent hint for the delivery collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Success,
    Warning,
    Error,
}

impl Accent {
    /// Embed colour.
    pub fn color(self) -> u32 {
        match self {
            Self::Success | Self::Warning => 7_419_530,
            Self::Error => 15_746_887,
        }
    }
}

/// Final text plus structural formatting hints. Success and failure share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedReport {
    pub content: String,
    pub accent: Accent,
    /// Raw error text when this report describes a failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderedReport {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
