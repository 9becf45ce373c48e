use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use advisor_gateway::{HistoryEntry, RemoteDataGateway};
use advisor_state::{Action, AppState, ChatHistoryLoadingState, DispatchError, SharedAppState};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::clear_all::{
    CLEARING_ERROR_RESET_DELAY, ClearAllFlags, ClearAllGuard, ClearAllRejection, ClearAllState,
    ClearAllTransition, ResetTicket,
};

pub const CLEAR_ALL_MENU_TEXT: &str = "Clear all chat history";
pub const CLEAR_ALL_MENU_ICON: &str = "Delete";
pub const LOADING_HISTORY_LABEL: &str = "Loading chat history";
pub const HISTORY_ERROR_FALLBACK: &str = "Error loading chat history";
pub const HISTORY_ERROR_DETAIL: &str = "Chat history can't be saved at this time";

const CONFIRM_TITLE: &str = "Are you sure you want to clear all chat history?";
const CONFIRM_SUBTEXT: &str = "All chat history will be permanently removed.";
const ERROR_TITLE: &str = "Error deleting all of chat history";
const ERROR_SUBTEXT: &str =
    "Please try again. If the problem persists, please contact the site administrator.";

/// The single body the panel shows for a given state.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryPanelContent {
    Empty,
    HistoryList(Vec<HistoryEntry>),
    Error {
        message: String,
        detail: &'static str,
    },
    Loading {
        label: &'static str,
    },
}

/// Decides the panel body from the loading state and backend availability.
///
/// On failure the last good history stays in the store but is not shown.
pub fn panel_content(state: &AppState) -> HistoryPanelContent {
    let availability = state.backend_availability();
    match state.chat_history_loading_state() {
        ChatHistoryLoadingState::Success if availability.available => {
            HistoryPanelContent::HistoryList(state.chat_history().to_vec())
        }
        ChatHistoryLoadingState::Success | ChatHistoryLoadingState::NotStarted => {
            HistoryPanelContent::Empty
        }
        ChatHistoryLoadingState::Fail => HistoryPanelContent::Error {
            message: availability
                .status_text()
                .unwrap_or(HISTORY_ERROR_FALLBACK)
                .to_string(),
            detail: HISTORY_ERROR_DETAIL,
        },
        ChatHistoryLoadingState::Loading => HistoryPanelContent::Loading {
            label: LOADING_HISTORY_LABEL,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemKey {
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub key: MenuItemKey,
    pub text: &'static str,
    pub icon: &'static str,
    pub disabled: bool,
}

/// Event that opens the context menu.
///
/// The controller marks it handled so the host skips its own context action.
#[derive(Debug, Default)]
pub struct MenuTrigger {
    default_prevented: bool,
}

impl MenuTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogButton {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearAllDialog {
    pub title: &'static str,
    pub subtext: &'static str,
    /// Backend detail of the last failed delete.
    pub detail: Option<String>,
    pub confirm: Option<DialogButton>,
    pub dismiss: DialogButton,
}

impl ClearAllDialog {
    fn for_state(state: &ClearAllState) -> Option<Self> {
        match state {
            ClearAllState::ConfirmOpen | ClearAllState::Clearing => {
                let enabled = !state.is_clearing();
                Some(Self {
                    title: CONFIRM_TITLE,
                    subtext: CONFIRM_SUBTEXT,
                    detail: None,
                    confirm: Some(DialogButton {
                        label: "Clear All",
                        enabled,
                    }),
                    dismiss: DialogButton {
                        label: "Cancel",
                        enabled,
                    },
                })
            }
            ClearAllState::Failed { detail } => Some(Self {
                title: ERROR_TITLE,
                subtext: ERROR_SUBTEXT,
                detail: detail.clone(),
                confirm: None,
                dismiss: DialogButton {
                    label: "Close",
                    enabled: true,
                },
            }),
            ClearAllState::Idle | ClearAllState::Dismissed { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum PanelRejection {
    ClearAll(ClearAllRejection),
    Dispatch(DispatchError),
}

impl From<ClearAllRejection> for PanelRejection {
    fn from(rejection: ClearAllRejection) -> Self {
        Self::ClearAll(rejection)
    }
}

#[derive(Default)]
struct PanelState {
    show_contextual_menu: bool,
    answer_loading: bool,
    clear_all: ClearAllState,
    next_ticket: u64,
    reset_task: Option<JoinHandle<()>>,
}

impl PanelState {
    fn transition(&mut self, transition: ClearAllTransition) -> Result<(), ClearAllRejection> {
        let next = self.clear_all.apply(transition)?;
        tracing::debug!(from = ?self.clear_all, to = ?next, "clear-all transition");
        self.clear_all = next;
        Ok(())
    }
}

/// Chat-history panel: body selection, context menu and the clear-all dialog.
///
/// Panel visibility itself lives in the shared store.
#[derive(Clone)]
pub struct HistoryPanelController {
    store: SharedAppState,
    gateway: Arc<dyn RemoteDataGateway>,
    state: Arc<Mutex<PanelState>>,
}

impl HistoryPanelController {
    pub fn new(store: SharedAppState, gateway: Arc<dyn RemoteDataGateway>) -> Self {
        Self {
            store,
            gateway,
            state: Arc::new(Mutex::new(PanelState::default())),
        }
    }

    pub fn content(&self) -> HistoryPanelContent {
        self.store.read(panel_content)
    }

    pub fn is_open(&self) -> bool {
        self.store.read(AppState::is_history_panel_open)
    }

    pub fn toggle_panel(&self) -> Result<(), PanelRejection> {
        self.store
            .dispatch(Action::ToggleHistoryPanel)
            .map_err(PanelRejection::Dispatch)
    }

    /// Mirrors whether the chat pane is still producing an answer.
    pub fn set_answer_loading(&self, answer_loading: bool) {
        self.lock().answer_loading = answer_loading;
    }

    pub fn open_context_menu(&self, trigger: &mut MenuTrigger) {
        trigger.prevent_default();
        self.lock().show_contextual_menu = true;
    }

    pub fn dismiss_context_menu(&self) {
        self.lock().show_contextual_menu = false;
    }

    pub fn is_context_menu_visible(&self) -> bool {
        self.lock().show_contextual_menu
    }

    pub fn menu_items(&self) -> Vec<MenuItem> {
        let guard = self.guard();
        vec![MenuItem {
            key: MenuItemKey::ClearAll,
            text: CLEAR_ALL_MENU_TEXT,
            icon: CLEAR_ALL_MENU_ICON,
            disabled: !guard.allows_clear_all(),
        }]
    }

    /// Item clicks close the menu the same way an outside dismiss does.
    pub fn click_menu_item(&self, key: MenuItemKey) -> Result<(), PanelRejection> {
        self.dismiss_context_menu();
        match key {
            MenuItemKey::ClearAll => self.open_clear_all_dialog(),
        }
    }

    pub fn open_clear_all_dialog(&self) -> Result<(), PanelRejection> {
        let guard = self.guard();
        let mut state = self.lock();
        state
            .transition(ClearAllTransition::Open(guard))
            .inspect_err(|rejection| {
                tracing::warn!(?rejection, "clear all chat history is not available");
            })?;

        if let Some(pending_reset) = state.reset_task.take() {
            pending_reset.abort();
        }
        Ok(())
    }

    /// Starts the bulk delete. Only one call is ever in flight.
    pub fn confirm_clear_all(&self) -> Result<JoinHandle<()>, PanelRejection> {
        self.lock()
            .transition(ClearAllTransition::Confirm)
            .inspect_err(|rejection| {
                tracing::debug!(?rejection, "ignoring clear-all confirmation");
            })?;

        let gateway = Arc::clone(&self.gateway);
        let store = self.store.clone();
        let weak_state = Arc::downgrade(&self.state);

        Ok(tokio::spawn(async move {
            let result = gateway.delete_all_history().await;

            let Some(state) = weak_state.upgrade() else {
                tracing::debug!("history panel torn down before bulk delete settled");
                return;
            };

            let transition = match result {
                Ok(outcome) if outcome.ok => {
                    if let Err(error) = store.dispatch(Action::DeleteAllHistory) {
                        tracing::error!("failed to clear chat history from state: {error}");
                    }
                    tracing::info!("cleared all chat history");
                    ClearAllTransition::Succeed
                }
                Ok(outcome) => {
                    tracing::warn!(detail = ?outcome.status_detail, "bulk history delete failed");
                    ClearAllTransition::Fail {
                        detail: outcome.status_detail,
                    }
                }
                Err(error) => {
                    tracing::error!("error deleting all chat history: {error}");
                    ClearAllTransition::Fail {
                        detail: Some(error.to_string()),
                    }
                }
            };

            if let Err(rejection) = lock_state(&state).transition(transition) {
                tracing::error!(?rejection, "bulk delete settled outside of clearing");
            }
        }))
    }

    /// Cancel or Close on the dialog. A no-op while the delete is in flight.
    pub fn dismiss_clear_all_dialog(&self) -> Result<(), PanelRejection> {
        let mut state = self.lock();
        state.next_ticket += 1;
        let ticket = ResetTicket::new(state.next_ticket);

        state
            .transition(ClearAllTransition::Dismiss { ticket })
            .inspect_err(|rejection| {
                tracing::debug!(?rejection, "ignoring clear-all dismissal");
            })?;

        if matches!(state.clear_all, ClearAllState::Dismissed { .. }) {
            if let Some(previous) = state.reset_task.take() {
                previous.abort();
            }
            state.reset_task = Some(spawn_error_reset(Arc::downgrade(&self.state), ticket));
        }
        Ok(())
    }

    pub fn clear_all_dialog(&self) -> Option<ClearAllDialog> {
        ClearAllDialog::for_state(&self.lock().clear_all)
    }

    pub fn clear_all_state(&self) -> ClearAllState {
        self.lock().clear_all.clone()
    }

    pub fn clear_all_flags(&self) -> ClearAllFlags {
        self.lock().clear_all.flags()
    }

    fn guard(&self) -> ClearAllGuard {
        let has_history = self.store.read(AppState::has_chat_history);
        ClearAllGuard {
            has_history,
            is_loading: self.lock().answer_loading,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        lock_state(&self.state)
    }
}

fn spawn_error_reset(weak_state: Weak<Mutex<PanelState>>, ticket: ResetTicket) -> JoinHandle<()> {
    let deadline = Instant::now() + CLEARING_ERROR_RESET_DELAY;
    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;

        let Some(state) = weak_state.upgrade() else {
            return;
        };
        let mut state = lock_state(&state);
        if state
            .transition(ClearAllTransition::ResetError { ticket })
            .is_ok()
            && state.clear_all == ClearAllState::Idle
        {
            state.reset_task = None;
        }
    })
}

fn lock_state(state: &Mutex<PanelState>) -> MutexGuard<'_, PanelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
