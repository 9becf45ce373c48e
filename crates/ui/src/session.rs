use std::sync::Arc;

use advisor_gateway::{GatewayResult, HttpGateway, RemoteDataGateway, User};
use advisor_state::SharedAppState;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::history::{HistoryLoader, HistoryPanelController};
use crate::selection::UserSelectionController;
use crate::settings::AdvisorSettings;

const SELECTION_CHANNEL_CAPACITY: usize = 16;

/// Published whenever a client is picked from the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSelected {
    pub client_id: String,
    pub client_name: String,
}

/// Tasks issued by [`AdvisorSession::start`]; `None` when already running.
pub struct SessionStartup {
    pub users: Option<JoinHandle<()>>,
    pub history: Option<JoinHandle<()>>,
}

/// One advisor session: a store, a gateway and the controllers over them.
///
/// Dropping the session drops every controller; in-flight responses are
/// discarded when they land.
pub struct AdvisorSession {
    store: SharedAppState,
    selection: UserSelectionController,
    history_panel: HistoryPanelController,
    history_loader: HistoryLoader,
    selections: broadcast::Sender<ClientSelected>,
}

impl AdvisorSession {
    /// Builds an HTTP-backed session from settings.
    pub fn connect(settings: &AdvisorSettings) -> GatewayResult<Self> {
        let gateway = HttpGateway::new(settings.gateway_config())?;
        tracing::info!(base_url = %settings.backend_base_url, "connected advisor session");
        Ok(Self::new(Arc::new(gateway), settings))
    }

    pub fn new(gateway: Arc<dyn RemoteDataGateway>, settings: &AdvisorSettings) -> Self {
        let store = SharedAppState::new();
        let (selections, _) = broadcast::channel(SELECTION_CHANNEL_CAPACITY);

        let publisher = selections.clone();
        let selection = UserSelectionController::new(store.clone(), Arc::clone(&gateway))
            .with_confirmation_duration(settings.confirmation_duration())
            .with_on_select(Arc::new(move |user: &User| {
                let Some(client_id) = user.client_id() else {
                    return;
                };
                let event = ClientSelected {
                    client_id: client_id.to_string(),
                    client_name: user.client_name.clone(),
                };
                if publisher.send(event).is_err() {
                    tracing::debug!(client_id, "no listeners for client selection");
                }
            }));

        Self {
            history_panel: HistoryPanelController::new(store.clone(), Arc::clone(&gateway)),
            history_loader: HistoryLoader::new(store.clone(), gateway),
            store,
            selection,
            selections,
        }
    }

    pub fn start(&self) -> SessionStartup {
        SessionStartup {
            users: self.selection.activate(),
            history: self.history_loader.activate(),
        }
    }

    pub fn store(&self) -> &SharedAppState {
        &self.store
    }

    pub fn selection(&self) -> &UserSelectionController {
        &self.selection
    }

    pub fn history_panel(&self) -> &HistoryPanelController {
        &self.history_panel
    }

    pub fn history_loader(&self) -> &HistoryLoader {
        &self.history_loader
    }

    pub fn subscribe_selections(&self) -> broadcast::Receiver<ClientSelected> {
        self.selections.subscribe()
    }
}
