//! Layout Component
//!
//! Sidebar navigation around the private pages.

use leptos::prelude::*;

use crate::components::{LogPanel, ThemeToggle};
use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let (show_logs, set_show_logs) = signal(false);

    let nav_class = move |section: &'static str| {
        move || {
            let active = match (section, ctx.route.get()) {
                ("boards", Route::Boards | Route::Board(_)) => true,
                ("timeline", Route::Timeline) => true,
                _ => false,
            };
            if active { "nav-link active" } else { "nav-link" }
        }
    };

    let user = move || {
        ctx.client()
            .session()
            .and_then(|s| s.user_id)
            .map(|id| format!("Signed in as {}", id))
    };

    view! {
        <div class="app-layout">
            <aside class="sidebar">
                <div class="sidebar-title">"Ambis"</div>
                <nav class="sidebar-nav">
                    <a class=nav_class("boards") href=Route::Boards.to_hash()>"Boards"</a>
                    <a class=nav_class("timeline") href=Route::Timeline.to_hash()>"Timeline"</a>
                </nav>
                <div class="sidebar-footer">
                    {move || user().map(|text| view! { <div class="sidebar-user">{text}</div> })}
                    <ThemeToggle />
                    <button class="secondary-btn" on:click=move |_| set_show_logs.set(true)>"Logs"</button>
                    <button class="logout-btn" on:click=move |_| ctx.logout()>"Log out"</button>
                </div>
            </aside>
            <main class="main-content">{children()}</main>
            <Show when=move || show_logs.get()>
                <LogPanel on_close=move |_: ()| set_show_logs.set(false) />
            </Show>
        </div>
    }
}
