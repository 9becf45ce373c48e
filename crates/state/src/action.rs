use advisor_gateway::{BackendAvailability, HistoryEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{OptionExt, ResultExt};

use crate::error::{DecodeActionSnafu, DispatchResult, InvalidActionSnafu};
use crate::state::ChatHistoryLoadingState;

/// Closed set of state mutations.
///
/// Serialized form is `{"type": "SET_SELECTED_CLIENT", "payload": ...}` so hosts
/// can forward messages without knowing the Rust types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetSelectedClient(String),
    ToggleHistoryPanel,
    SetHistoryLoadingState(ChatHistoryLoadingState),
    SetChatHistory(Vec<HistoryEntry>),
    DeleteAllHistory,
    SetBackendAvailability(BackendAvailability),
}

impl Action {
    pub const TYPES: [&'static str; 6] = [
        "SET_SELECTED_CLIENT",
        "TOGGLE_HISTORY_PANEL",
        "SET_HISTORY_LOADING_STATE",
        "SET_CHAT_HISTORY",
        "DELETE_ALL_HISTORY",
        "SET_BACKEND_AVAILABILITY",
    ];

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SetSelectedClient(_) => Self::TYPES[0],
            Self::ToggleHistoryPanel => Self::TYPES[1],
            Self::SetHistoryLoadingState(_) => Self::TYPES[2],
            Self::SetChatHistory(_) => Self::TYPES[3],
            Self::DeleteAllHistory => Self::TYPES[4],
            Self::SetBackendAvailability(_) => Self::TYPES[5],
        }
    }

    /// Decodes a serialized action message.
    ///
    /// An unknown `type` is an `InvalidAction`; a known type with a malformed
    /// payload is a `DecodeAction`.
    pub fn from_message(message: &Value) -> DispatchResult<Self> {
        let action_type = message
            .get("type")
            .and_then(Value::as_str)
            .context(InvalidActionSnafu {
                stage: "read-action-type",
                action_type: message
                    .get("type")
                    .map(Value::to_string)
                    .unwrap_or_else(|| "<missing>".to_string()),
            })?;

        if !Self::TYPES.contains(&action_type) {
            return InvalidActionSnafu {
                stage: "match-action-type",
                action_type,
            }
            .fail();
        }

        serde_json::from_value(message.clone()).context(DecodeActionSnafu {
            stage: "decode-action-payload",
        })
    }
}
