use advisor_gateway::{BackendAvailability, HistoryEntry};
use serde::{Deserialize, Serialize};

/// Lifecycle of the chat-history fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatHistoryLoadingState {
    #[default]
    NotStarted,
    Loading,
    Success,
    Fail,
}

impl ChatHistoryLoadingState {
    pub const ALL: [Self; 4] = [Self::NotStarted, Self::Loading, Self::Success, Self::Fail];
}

/// Session-lifetime UI state shared by every surface.
///
/// Fields are private to this crate; the only way to change them is
/// [`crate::SharedAppState::dispatch`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) selected_client_id: Option<String>,
    pub(crate) chat_history: Vec<HistoryEntry>,
    pub(crate) chat_history_loading_state: ChatHistoryLoadingState,
    pub(crate) backend_availability: BackendAvailability,
    pub(crate) is_history_panel_open: bool,
}

impl AppState {
    pub fn selected_client_id(&self) -> Option<&str> {
        self.selected_client_id.as_deref()
    }

    pub fn chat_history(&self) -> &[HistoryEntry] {
        &self.chat_history
    }

    pub fn has_chat_history(&self) -> bool {
        !self.chat_history.is_empty()
    }

    pub fn chat_history_loading_state(&self) -> ChatHistoryLoadingState {
        self.chat_history_loading_state
    }

    pub fn backend_availability(&self) -> &BackendAvailability {
        &self.backend_availability
    }

    pub fn is_history_panel_open(&self) -> bool {
        self.is_history_panel_open
    }
}
