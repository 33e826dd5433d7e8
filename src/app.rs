//! Ambis Board Frontend App
//!
//! Wires the API client into context, follows the hash route and keeps the
//! realtime socket in step with the session and the open board.

use std::rc::Rc;

use board_core::{BoardClient, ClientConfig};
use leptos::ev;
use leptos::prelude::*;
use reactive_stores::Store;

use crate::api::{self, HttpApi};
use crate::components::{BoardPage, BoardsPage, Layout, LoginPage, TimelinePage};
use crate::context::AppContext;
use crate::realtime::RealtimeLink;
use crate::routes::{self, Route};
use crate::storage;
use crate::store::AppState;
use crate::theme;

#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    let http = Rc::new(HttpApi::new(config.clone()));
    let key_values = storage::open();
    theme::apply(theme::load(key_values.as_ref()));
    let client = Rc::new(BoardClient::new(http, key_values, config.clone()));

    let (reload_trigger, set_reload_trigger) = signal(0u32);
    let ctx = AppContext::new(client, (reload_trigger, set_reload_trigger));
    provide_context(ctx);
    provide_context(Store::new(AppState::default()));

    let _hash_listener = window_event_listener(ev::hashchange, move |_| {
        ctx.route.set(routes::current());
    });

    // Page actually shown after the session check
    let shown = Memo::new(move |_| routes::guard(ctx.route.get(), ctx.authenticated.get()));

    // Keep the address bar in step with redirects
    Effect::new(move |_| {
        let shown = shown.get();
        if ctx.route.get_untracked() != shown {
            log::debug!("[ROUTE] redirect to {:?}", shown);
            routes::navigate(&shown);
        }
    });

    if config.enable_socket {
        let endpoint = config.socket_endpoint();
        Effect::new(move |_| {
            let authenticated = ctx.authenticated.get();
            if !authenticated {
                ctx.set_realtime(None);
                return;
            }
            if ctx.has_realtime() {
                return;
            }
            let Some(session) = ctx.client().session() else { return };
            let url = format!("{}{}", endpoint, api::token_query(&session.token));
            let link = RealtimeLink::connect(url, move |event| {
                let current = shown.get_untracked();
                if ctx.client().apply_server_event(&event, current.board_id()) {
                    ctx.reload();
                }
            });
            ctx.set_realtime(Some(link));
            if let Some(board_id) = shown.get_untracked().board_id() {
                ctx.join_board(board_id);
            }
        });

        // Follow the open board
        Effect::new(move |previous: Option<Option<String>>| {
            let current = shown.get().board_id().map(str::to_string);
            if let Some(Some(previous)) = previous.as_ref() {
                if current.as_ref() != Some(previous) {
                    ctx.leave_board(previous);
                }
            }
            if let Some(board_id) = current.as_deref() {
                ctx.join_board(board_id);
            }
            current
        });
    }

    view! {
        {move || match shown.get() {
            Route::Login => view! { <LoginPage /> }.into_any(),
            route => view! {
                <Layout>
                    {match route {
                        Route::Board(board_id) => view! { <BoardPage board_id=board_id /> }.into_any(),
                        Route::Timeline => view! { <TimelinePage /> }.into_any(),
                        _ => view! { <BoardsPage /> }.into_any(),
                    }}
                </Layout>
            }.into_any(),
        }}
    }
}
