#![allow(warnings)]
//! Ambis Board Frontend Entry Point

mod api;
mod app;
mod components;
mod config;
mod context;
mod logging;
mod realtime;
mod routes;
mod storage;
mod store;
mod theme;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    let config = config::load();
    logging::init(config.log_level);
    log::info!("starting board client, api base {:?}", config.api_base_url);
    mount_to_body(move || view! { <App config=config.clone() /> });
}
