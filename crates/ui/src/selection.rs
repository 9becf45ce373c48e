use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use advisor_gateway::{RemoteDataGateway, User};
use advisor_state::{Action, DispatchError, SharedAppState};
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_CONFIRMATION_DURATION: Duration = Duration::from_secs(3);
pub const CONFIRMATION_TITLE: &str = "Chat saved";

/// Callback used to let sibling surfaces react to a selection.
pub type SelectionCallback = Arc<dyn Fn(&User) + Send + Sync>;

/// What the client list surface should draw.
#[derive(Debug, Clone, PartialEq)]
pub enum UserListView {
    /// Fetch outstanding, or failed; there is no retry.
    Loading,
    Ready(Vec<User>),
}

/// Transient "chat saved" feedback after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationIndicator {
    pub client_id: String,
    pub client_name: String,
    sequence: u64,
}

impl ConfirmationIndicator {
    pub fn title(&self) -> &'static str {
        CONFIRMATION_TITLE
    }

    pub fn subtitle(&self) -> String {
        format!("Chat history with \"{}\" saved", self.client_name)
    }
}

#[derive(Debug)]
pub enum SelectionRejection {
    MissingClientId { client_name: String },
    Dispatch(DispatchError),
}

#[derive(Default)]
struct SelectionState {
    users: Option<Vec<User>>,
    fetch_requested: bool,
    selected_client_id: Option<String>,
    confirmation: Option<ConfirmationIndicator>,
    confirmation_sequence: u64,
    dismiss_task: Option<JoinHandle<()>>,
}

/// Client list and selection.
///
/// Clones share the same controller. Background tasks only hold weak
/// references, so results that arrive after the last clone is dropped are
/// discarded.
#[derive(Clone)]
pub struct UserSelectionController {
    store: SharedAppState,
    gateway: Arc<dyn RemoteDataGateway>,
    on_select: Option<SelectionCallback>,
    confirmation_duration: Duration,
    state: Arc<Mutex<SelectionState>>,
}

impl UserSelectionController {
    pub fn new(store: SharedAppState, gateway: Arc<dyn RemoteDataGateway>) -> Self {
        Self {
            store,
            gateway,
            on_select: None,
            confirmation_duration: DEFAULT_CONFIRMATION_DURATION,
            state: Arc::new(Mutex::new(SelectionState::default())),
        }
    }

    pub fn with_on_select(mut self, on_select: SelectionCallback) -> Self {
        self.on_select = Some(on_select);
        self
    }

    pub fn with_confirmation_duration(mut self, confirmation_duration: Duration) -> Self {
        self.confirmation_duration = confirmation_duration;
        self
    }

    /// Issues the one and only users fetch for this controller.
    ///
    /// Returns `None` when the fetch was already requested.
    pub fn activate(&self) -> Option<JoinHandle<()>> {
        {
            let mut state = self.lock();
            if state.fetch_requested {
                tracing::debug!("users fetch already requested; ignoring activation");
                return None;
            }
            state.fetch_requested = true;
        }

        let gateway = Arc::clone(&self.gateway);
        let weak_state = Arc::downgrade(&self.state);

        Some(tokio::spawn(async move {
            let result = gateway.list_users().await;

            let Some(state) = weak_state.upgrade() else {
                tracing::debug!("user list torn down before users arrived; dropping result");
                return;
            };

            match result {
                Ok(users) => {
                    tracing::info!(count = users.len(), "loaded client list");
                    lock_state(&state).users = Some(users);
                }
                Err(error) => {
                    // Known gap: the list keeps showing its loading placeholder.
                    tracing::error!("error fetching users: {error}");
                }
            }
        }))
    }

    pub fn list_view(&self) -> UserListView {
        match &self.lock().users {
            Some(users) => UserListView::Ready(users.clone()),
            None => UserListView::Loading,
        }
    }

    pub fn select_user(&self, user: &User) -> Result<(), SelectionRejection> {
        let Some(client_id) = user.client_id() else {
            tracing::warn!(
                client_name = %user.client_name,
                "user does not have a client id; selection ignored"
            );
            return Err(SelectionRejection::MissingClientId {
                client_name: user.client_name.clone(),
            });
        };

        self.store
            .dispatch(Action::SetSelectedClient(client_id.to_string()))
            .map_err(SelectionRejection::Dispatch)?;

        self.raise_confirmation(client_id, &user.client_name);
        tracing::info!(client_id, "client selected");

        if let Some(on_select) = &self.on_select {
            on_select(user);
        }
        Ok(())
    }

    pub fn selected_client_id(&self) -> Option<String> {
        self.lock().selected_client_id.clone()
    }

    pub fn is_selected(&self, user: &User) -> bool {
        let state = self.lock();
        user.client_id()
            .is_some_and(|id| state.selected_client_id.as_deref() == Some(id))
    }

    pub fn confirmation(&self) -> Option<ConfirmationIndicator> {
        self.lock().confirmation.clone()
    }

    /// Close button on the indicator.
    pub fn close_confirmation(&self) {
        let mut state = self.lock();
        state.confirmation = None;
        if let Some(task) = state.dismiss_task.take() {
            task.abort();
        }
    }

    fn raise_confirmation(&self, client_id: &str, client_name: &str) {
        let mut state = self.lock();
        state.confirmation_sequence += 1;
        let sequence = state.confirmation_sequence;

        state.selected_client_id = Some(client_id.to_string());
        state.confirmation = Some(ConfirmationIndicator {
            client_id: client_id.to_string(),
            client_name: client_name.to_string(),
            sequence,
        });

        // A new selection replaces the indicator outright, timer included.
        if let Some(previous) = state.dismiss_task.take() {
            previous.abort();
        }
        state.dismiss_task = Some(spawn_dismissal(
            Arc::downgrade(&self.state),
            sequence,
            self.confirmation_duration,
        ));
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        lock_state(&self.state)
    }
}

fn spawn_dismissal(
    weak_state: Weak<Mutex<SelectionState>>,
    sequence: u64,
    duration: Duration,
) -> JoinHandle<()> {
    // Deadline is fixed at raise time, not when the task first gets polled.
    let deadline = Instant::now() + duration;
    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;

        let Some(state) = weak_state.upgrade() else {
            return;
        };
        let mut state = lock_state(&state);
        let is_current = state
            .confirmation
            .as_ref()
            .is_some_and(|indicator| indicator.sequence == sequence);
        if is_current {
            state.confirmation = None;
            state.dismiss_task = None;
        }
    })
}

fn lock_state(state: &Mutex<SelectionState>) -> MutexGuard<'_, SelectionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
