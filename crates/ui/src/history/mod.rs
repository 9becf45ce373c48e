pub mod clear_all;
pub mod loader;
pub mod panel;

pub use clear_all::{
    CLEARING_ERROR_RESET_DELAY, ClearAllFlags, ClearAllGuard, ClearAllRejection, ClearAllState,
    ClearAllTransition, ResetTicket,
};
pub use loader::HistoryLoader;
pub use panel::{
    ClearAllDialog, DialogButton, HISTORY_ERROR_DETAIL, HISTORY_ERROR_FALLBACK,
    HistoryPanelContent, HistoryPanelController, LOADING_HISTORY_LABEL, MenuItem, MenuItemKey,
    MenuTrigger, PanelRejection, panel_content,
};
