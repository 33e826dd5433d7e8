//! Theme Toggle Component

use leptos::prelude::*;

use crate::storage;
use crate::theme::{self, Theme};

#[component]
pub fn ThemeToggle() -> impl IntoView {
    let key_values = StoredValue::new_local(storage::open());
    let (current, set_current) = signal(key_values.with_value(|s| theme::load(s.as_ref())));

    let flip = move |_| {
        let next = current.get_untracked().toggle();
        key_values.with_value(|s| theme::save(s.as_ref(), next));
        theme::apply(next);
        log::debug!("[THEME] switched to {}", next.as_str());
        set_current.set(next);
    };

    view! {
        <button class="theme-toggle" on:click=flip>{move || current.get().label()}</button>
    }
}
