use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One advisory client as listed by the backend.
///
/// The backend speaks PascalCase keys, except for `chartUrl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(default, deserialize_with = "deserialize_client_id")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub next_meeting: Option<String>,
    #[serde(default)]
    pub next_meeting_time: Option<String>,
    #[serde(default)]
    pub next_meeting_end_time: Option<String>,
    #[serde(default)]
    pub last_meeting: Option<String>,
    #[serde(default)]
    pub last_meeting_start_time: Option<String>,
    #[serde(default)]
    pub last_meeting_end_time: Option<String>,
    #[serde(default)]
    pub asset_value: Option<String>,
    #[serde(default)]
    pub client_summary: Option<String>,
    #[serde(default, rename = "chartUrl")]
    pub chart_url: Option<String>,
}

impl User {
    pub fn new(client_id: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_name: client_name.into(),
            ..Self::default()
        }
    }

    /// Returns the identity of this client, or `None` when the backend sent a blank one.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Persisted chat conversation. Treated as an opaque value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl HistoryEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            date: None,
            payload: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Result of the bulk-delete call for expected failure classes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteAllOutcome {
    pub ok: bool,
    pub status_detail: Option<String>,
}

impl DeleteAllOutcome {
    pub fn succeeded() -> Self {
        Self {
            ok: true,
            status_detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            status_detail: Some(detail.into()),
        }
    }
}

/// Availability of the history store behind the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendAvailability {
    pub available: bool,
    #[serde(default)]
    pub status: Option<String>,
}

impl BackendAvailability {
    pub fn available(status: impl Into<String>) -> Self {
        Self {
            available: true,
            status: Some(status.into()),
        }
    }

    pub fn unavailable(status: impl Into<String>) -> Self {
        Self {
            available: false,
            status: Some(status.into()),
        }
    }

    /// Status text worth showing, ignoring blank strings.
    pub fn status_text(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
    }
}

/// Fixed status strings reported by the availability probe.
pub mod backend_status {
    pub const WORKING: &str = "History store is configured and working";
    pub const NOT_CONFIGURED: &str = "History store is not configured";
    pub const NOT_WORKING: &str = "History store is not working";
    pub const INVALID_CREDENTIALS: &str = "History store has invalid credentials";
}

fn deserialize_client_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // The users endpoint has shipped both numeric and string identifiers.
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => Some(raw),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}
