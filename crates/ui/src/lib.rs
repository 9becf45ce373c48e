#![deny(unsafe_code)]

//! Headless controllers for the client advisor surfaces.
//!
//! Rendering is left to the host; every controller here exposes plain view
//! data and takes user intents as method calls.

/// Chat-history panel, its loader and the clear-all workflow.
pub mod history;
pub mod selection;
pub mod session;
/// Settings loading.
pub mod settings;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use history::{HistoryLoader, HistoryPanelContent, HistoryPanelController};
pub use selection::{ConfirmationIndicator, UserListView, UserSelectionController};
pub use session::{AdvisorSession, ClientSelected, SessionStartup};
pub use settings::{AdvisorSettings, SettingsError, SettingsStore};
