//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use board_core::{Board, BoardView, DayGroup};
use leptos::prelude::*;
use reactive_stores::Store;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Boards visible to the signed-in user
    pub boards: Vec<Board>,
    /// Board currently open, grouped by column
    pub board_view: Option<BoardView>,
    /// Activity feed for the timeline page
    pub feed: Vec<DayGroup>,
    /// Bumped whenever notes, labels or priorities change locally
    pub overlay_version: u32,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Remove a task from the open board view
pub fn store_remove_task(store: &AppStore, task_id: &str) {
    if let Some(view) = store.board_view().write().as_mut() {
        for group in view.groups.iter_mut() {
            group.tasks.retain(|t| t.id != task_id);
        }
    }
}

/// Remove a board from the list
pub fn store_remove_board(store: &AppStore, board_id: &str) {
    store.boards().write().retain(|b| b.id != board_id);
}

/// Signal that client-only annotations changed
pub fn store_touch_overlay(store: &AppStore) {
    *store.overlay_version().write() += 1;
}
