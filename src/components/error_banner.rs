use leptos::prelude::*;

/// Dismissable error line; hidden while `error` is `None`
#[component]
pub fn ErrorBanner(error: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        {move || error.get().map(|message| view! {
            <div class="error-banner" role="alert">
                <span>{message}</span>
                <button class="banner-close" on:click=move |_| error.set(None)>"×"</button>
            </div>
        })}
    }
}
