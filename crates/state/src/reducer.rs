use snafu::ensure;

use crate::action::Action;
use crate::error::{DispatchResult, InvalidArgumentSnafu};
use crate::state::AppState;

/// Applies one action to the state.
///
/// Validation happens before any field is touched, so a rejected action never
/// leaves a partial write behind. Returns whether the state changed.
pub(crate) fn reduce(state: &mut AppState, action: Action) -> DispatchResult<bool> {
    match action {
        Action::SetSelectedClient(client_id) => {
            let client_id = client_id.trim();
            ensure!(
                !client_id.is_empty(),
                InvalidArgumentSnafu {
                    stage: "reduce-set-selected-client",
                    action: "SET_SELECTED_CLIENT",
                    details: "client id must not be empty",
                }
            );
            Ok(replace(
                &mut state.selected_client_id,
                Some(client_id.to_string()),
            ))
        }
        Action::ToggleHistoryPanel => {
            state.is_history_panel_open = !state.is_history_panel_open;
            Ok(true)
        }
        Action::SetHistoryLoadingState(loading_state) => {
            // A failed fetch keeps the last good history; only the view decides what to show.
            Ok(replace(&mut state.chat_history_loading_state, loading_state))
        }
        Action::SetChatHistory(entries) => Ok(replace(&mut state.chat_history, entries)),
        Action::DeleteAllHistory => {
            let changed = !state.chat_history.is_empty();
            state.chat_history.clear();
            Ok(changed)
        }
        Action::SetBackendAvailability(availability) => {
            Ok(replace(&mut state.backend_availability, availability))
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
