use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use advisor_gateway::{BackendAvailability, RemoteDataGateway, backend_status};
use advisor_state::{Action, ChatHistoryLoadingState, SharedAppState};
use tokio::task::JoinHandle;

#[derive(Default)]
struct LoaderState {
    activated: bool,
    generation: u64,
}

/// Probes the history store and fills the shared chat history.
///
/// Each load bumps a generation; a slower, older load never overwrites a
/// newer one.
#[derive(Clone)]
pub struct HistoryLoader {
    store: SharedAppState,
    gateway: Arc<dyn RemoteDataGateway>,
    state: Arc<Mutex<LoaderState>>,
}

impl HistoryLoader {
    pub fn new(store: SharedAppState, gateway: Arc<dyn RemoteDataGateway>) -> Self {
        Self {
            store,
            gateway,
            state: Arc::new(Mutex::new(LoaderState::default())),
        }
    }

    /// First load. Later calls are ignored; use [`Self::reload`] instead.
    pub fn activate(&self) -> Option<JoinHandle<()>> {
        {
            let mut state = self.lock();
            if state.activated {
                tracing::debug!("history already requested; ignoring activation");
                return None;
            }
            state.activated = true;
        }
        Some(self.reload())
    }

    pub fn reload(&self) -> JoinHandle<()> {
        let generation = {
            let mut state = self.lock();
            state.activated = true;
            state.generation += 1;
            state.generation
        };

        self.dispatch(Action::SetHistoryLoadingState(
            ChatHistoryLoadingState::Loading,
        ));

        let load = HistoryLoad {
            store: self.store.clone(),
            gateway: Arc::clone(&self.gateway),
            state: Arc::downgrade(&self.state),
            generation,
        };
        tokio::spawn(load.run())
    }

    fn dispatch(&self, action: Action) {
        dispatch_logged(&self.store, action);
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct HistoryLoad {
    store: SharedAppState,
    gateway: Arc<dyn RemoteDataGateway>,
    state: Weak<Mutex<LoaderState>>,
    generation: u64,
}

impl HistoryLoad {
    async fn run(self) {
        let probe = self.gateway.ensure_history().await;
        if !self.is_current() {
            return;
        }

        let availability = match probe {
            Ok(availability) if availability.available => availability,
            Ok(availability) => {
                tracing::warn!(status = ?availability.status, "history store unavailable");
                self.settle_failed(availability);
                return;
            }
            Err(error) => {
                tracing::error!("error probing history store: {error}");
                self.settle_failed(BackendAvailability::unavailable(
                    backend_status::NOT_CONFIGURED,
                ));
                return;
            }
        };

        let history = self.gateway.fetch_history(0).await;
        if !self.is_current() {
            return;
        }

        match history {
            Ok(entries) => {
                tracing::info!(count = entries.len(), "loaded chat history");
                self.dispatch(Action::SetChatHistory(entries));
                self.dispatch(Action::SetBackendAvailability(availability));
                self.dispatch(Action::SetHistoryLoadingState(
                    ChatHistoryLoadingState::Success,
                ));
            }
            Err(error) => {
                tracing::error!("error fetching chat history: {error}");
                self.settle_failed(BackendAvailability::unavailable(
                    backend_status::NOT_WORKING,
                ));
            }
        }
    }

    fn settle_failed(&self, availability: BackendAvailability) {
        self.dispatch(Action::SetBackendAvailability(availability));
        self.dispatch(Action::SetHistoryLoadingState(
            ChatHistoryLoadingState::Fail,
        ));
    }

    fn is_current(&self) -> bool {
        let Some(state) = self.state.upgrade() else {
            tracing::debug!("history loader torn down; dropping result");
            return false;
        };
        let current = state.lock().unwrap_or_else(PoisonError::into_inner).generation;
        if current != self.generation {
            tracing::debug!(
                stale = self.generation,
                current,
                "newer history load in flight; dropping result"
            );
            return false;
        }
        true
    }

    fn dispatch(&self, action: Action) {
        dispatch_logged(&self.store, action);
    }
}

fn dispatch_logged(store: &SharedAppState, action: Action) {
    let action_type = action.type_name();
    if let Err(error) = store.dispatch(action) {
        tracing::error!(action_type, "failed to apply history update: {error}");
    }
}
