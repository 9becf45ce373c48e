use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::action::Action;
use crate::error::DispatchResult;
use crate::reducer::reduce;
use crate::state::AppState;

/// Handle to the session's single state store.
///
/// Clones share the same store. Every write goes through [`Self::dispatch`],
/// which runs the reducer inside the watch channel's write lock, so each
/// dispatch is atomic with respect to every other one.
#[derive(Clone)]
pub struct SharedAppState {
    sender: Arc<watch::Sender<AppState>>,
}

impl Default for SharedAppState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedAppState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SharedAppState")
            .field("state", &*self.sender.borrow())
            .finish()
    }
}

impl SharedAppState {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(AppState::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn dispatch(&self, action: Action) -> DispatchResult<()> {
        let action_type = action.type_name();
        let mut outcome = Ok(false);

        self.sender.send_if_modified(|state| {
            outcome = reduce(state, action);
            matches!(outcome, Ok(true))
        });

        match outcome {
            Ok(changed) => {
                tracing::trace!(action = action_type, changed, "dispatched action");
                Ok(())
            }
            Err(error) => {
                tracing::error!(action = action_type, %error, "dispatch rejected");
                Err(error)
            }
        }
    }

    /// Dispatches a serialized `{"type", "payload"}` message.
    pub fn dispatch_message(&self, message: &Value) -> DispatchResult<()> {
        let action = Action::from_message(message).inspect_err(|error| {
            tracing::error!(%error, "dropping undecodable action message");
        })?;
        self.dispatch(action)
    }

    pub fn snapshot(&self) -> AppState {
        self.sender.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, reader: impl FnOnce(&AppState) -> R) -> R {
        reader(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> StateSubscription {
        StateSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Observer of state changes. Only dispatches that changed state wake it.
pub struct StateSubscription {
    receiver: watch::Receiver<AppState>,
}

impl StateSubscription {
    /// Waits for the next change. Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Current state, marking it as seen.
    pub fn current(&mut self) -> AppState {
        self.receiver.borrow_and_update().clone()
    }
}

#[cfg(test)]
mod tests {
    use advisor_gateway::HistoryEntry;
    use serde_json::json;

    use super::*;
    use crate::state::ChatHistoryLoadingState;

    #[test]
    fn clones_share_one_store() {
        let store = SharedAppState::new();
        let other = store.clone();

        store
            .dispatch(Action::SetSelectedClient("10".to_string()))
            .expect("dispatch");

        assert_eq!(
            other.read(|state| state.selected_client_id().map(str::to_string)),
            Some("10".to_string())
        );
    }

    #[test]
    fn rejected_dispatch_is_reported_and_leaves_state_alone() {
        let store = SharedAppState::new();
        store
            .dispatch(Action::SetSelectedClient("10".to_string()))
            .expect("dispatch");
        let before = store.snapshot();

        let error = store
            .dispatch(Action::SetSelectedClient(String::new()))
            .expect_err("empty id");
        assert!(error.is_invalid_argument());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn unknown_message_type_is_reported() {
        let store = SharedAppState::new();
        let error = store
            .dispatch_message(&json!({"type": "FETCH_EVERYTHING"}))
            .expect_err("unknown action");
        assert!(error.is_invalid_action());
        assert_eq!(store.snapshot(), AppState::default());
    }

    #[test]
    fn loading_state_is_always_one_of_four_values() {
        let store = SharedAppState::new();
        let messages = [
            json!({"type": "SET_HISTORY_LOADING_STATE", "payload": "loading"}),
            json!({"type": "SET_CHAT_HISTORY", "payload": [{"id": "a"}]}),
            json!({"type": "SET_HISTORY_LOADING_STATE", "payload": "success"}),
            json!({"type": "SET_HISTORY_LOADING_STATE", "payload": "unknown"}),
            json!({"type": "DELETE_ALL_HISTORY"}),
            json!({"type": "SET_HISTORY_LOADING_STATE", "payload": "fail"}),
        ];

        for message in &messages {
            let _ = store.dispatch_message(message);
            let loading_state = store.read(|state| state.chat_history_loading_state());
            assert!(ChatHistoryLoadingState::ALL.contains(&loading_state));
        }
        assert_eq!(
            store.read(|state| state.chat_history_loading_state()),
            ChatHistoryLoadingState::Fail
        );
    }

    #[tokio::test]
    async fn subscribers_wake_only_on_real_changes() {
        let store = SharedAppState::new();
        let mut subscription = store.subscribe();

        store.dispatch(Action::DeleteAllHistory).expect("no-op dispatch");
        assert!(!subscription.has_changed());

        store
            .dispatch(Action::SetChatHistory(vec![HistoryEntry::new("h-1")]))
            .expect("dispatch");
        assert!(subscription.changed().await);
        assert_eq!(subscription.current().chat_history().len(), 1);
    }

    #[tokio::test]
    async fn subscription_ends_when_store_is_dropped() {
        let store = SharedAppState::new();
        let mut subscription = store.subscribe();
        drop(store);

        assert!(!subscription.changed().await);
    }
}
