//! Application Context
//!
//! Shared state provided via Leptos Context API.

use std::rc::Rc;

use board_core::{ApiError, BoardClient};
use leptos::prelude::*;

use crate::realtime::RealtimeLink;
use crate::routes::{self, Route};

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    client: StoredValue<Rc<BoardClient>, LocalStorage>,
    /// Trigger to reload data from the API - read
    pub reload_trigger: ReadSignal<u32>,
    /// Trigger to reload data from the API - write
    set_reload_trigger: WriteSignal<u32>,
    /// Route requested by the address bar
    pub route: RwSignal<Route>,
    /// Whether a session is stored
    pub authenticated: RwSignal<bool>,
    realtime: StoredValue<Option<RealtimeLink>, LocalStorage>,
}

impl AppContext {
    pub fn new(client: Rc<BoardClient>, reload_trigger: (ReadSignal<u32>, WriteSignal<u32>)) -> Self {
        let authenticated = client.is_authenticated();
        Self {
            client: StoredValue::new_local(client),
            reload_trigger: reload_trigger.0,
            set_reload_trigger: reload_trigger.1,
            route: RwSignal::new(routes::current()),
            authenticated: RwSignal::new(authenticated),
            realtime: StoredValue::new_local(None),
        }
    }

    pub fn client(&self) -> Rc<BoardClient> {
        self.client.get_value()
    }

    /// Trigger a reload of everything on screen
    pub fn reload(&self) {
        self.set_reload_trigger.update(|v| *v += 1);
    }

    pub fn navigate(&self, route: Route) {
        routes::navigate(&route);
        self.route.set(route);
    }

    pub fn signed_in(&self) {
        self.authenticated.set(true);
        self.navigate(Route::Boards);
    }

    pub fn logout(&self) {
        self.client().logout();
        self.set_realtime(None);
        self.authenticated.set(false);
        self.navigate(Route::Login);
    }

    /// Message for an inline banner; a rejected session sends the user
    /// back to the login page
    pub fn error_message(&self, error: &ApiError) -> String {
        log::warn!("request failed: {}", error);
        if error.is_unauthorized() {
            self.set_realtime(None);
            self.authenticated.set(false);
            self.navigate(Route::Login);
        }
        error.to_string()
    }

    // ========================
    // Realtime
    // ========================

    pub fn has_realtime(&self) -> bool {
        self.realtime.with_value(|link| link.is_some())
    }

    /// Replace the socket; `None` closes the current one
    pub fn set_realtime(&self, link: Option<RealtimeLink>) {
        self.realtime.update_value(|current| *current = link);
    }

    pub fn join_board(&self, board_id: &str) {
        self.realtime.with_value(|link| {
            if let Some(link) = link {
                link.join_board(board_id);
            }
        });
    }

    pub fn leave_board(&self, board_id: &str) {
        self.realtime.with_value(|link| {
            if let Some(link) = link {
                link.leave_board(board_id);
            }
        });
    }
}
