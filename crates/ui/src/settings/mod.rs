pub mod state;

pub use state::{AdvisorSettings, SettingsError, SettingsStore};
