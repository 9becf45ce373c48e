//! Shared application state for the advisor session.
//!
//! One store per session, a closed set of actions, one reducer.

pub mod action;
pub mod error;
mod reducer;
pub mod state;
pub mod store;

pub use action::Action;
pub use advisor_gateway::{BackendAvailability, HistoryEntry};
pub use error::{DispatchError, DispatchResult};
pub use state::{AppState, ChatHistoryLoadingState};
pub use store::{SharedAppState, StateSubscription};
