//! Login Page Component
//!
//! Sign in / Register tabs. Field errors render under each input; server
//! errors render in a banner above the form.

use board_core::{ApiError, Credentials, FieldErrors, Registration};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::ErrorBanner;
use crate::context::AppContext;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    SignIn,
    Register,
}

#[component]
fn FieldMessage(errors: RwSignal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors
            .with(|e| e.get(field).map(str::to_string))
            .map(|message| view! { <div class="field-error">{message}</div> })
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let tab = RwSignal::new(Tab::SignIn);
    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let field_errors = RwSignal::new(FieldErrors::default());
    let banner = RwSignal::new(None::<String>);
    let notice = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let switch_tab = move |next: Tab| {
        tab.set(next);
        field_errors.set(FieldErrors::default());
        banner.set(None);
    };

    // Split validation failures from server failures
    let report = move |error: ApiError| match error {
        ApiError::Validation(errors) => field_errors.set(errors),
        other => banner.set(Some(other.to_string())),
    };

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        field_errors.set(FieldErrors::default());
        banner.set(None);
        busy.set(true);

        let client = ctx.client();
        let mode = tab.get_untracked();
        let email_value = email.get_untracked().trim().to_string();
        let password_value = password.get_untracked();
        let name_value = name.get_untracked().trim().to_string();

        spawn_local(async move {
            match mode {
                Tab::SignIn => {
                    let credentials = Credentials {
                        email: email_value,
                        password: password_value,
                    };
                    match client.login(&credentials).await {
                        Ok(_) => {
                            password.set(String::new());
                            ctx.signed_in();
                        }
                        Err(e) => report(e),
                    }
                }
                Tab::Register => {
                    let registration = Registration {
                        name: name_value,
                        email: email_value,
                        password: password_value,
                    };
                    match client.register(&registration).await {
                        Ok(()) => {
                            password.set(String::new());
                            switch_tab(Tab::SignIn);
                            notice.set(Some("Account created. You can sign in now.".to_string()));
                        }
                        Err(e) => report(e),
                    }
                }
            }
            busy.set(false);
        });
    };

    let tab_class = move |which: Tab| {
        move || if tab.get() == which { "tab active" } else { "tab" }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Ambis"</h1>
                <div class="tabs">
                    <button class=tab_class(Tab::SignIn) on:click=move |_| switch_tab(Tab::SignIn)>
                        "Sign in"
                    </button>
                    <button class=tab_class(Tab::Register) on:click=move |_| switch_tab(Tab::Register)>
                        "Register"
                    </button>
                </div>

                {move || notice.get().map(|text| view! { <div class="notice-banner">{text}</div> })}
                <ErrorBanner error=banner />

                <form class="login-form" on:submit=submit>
                    <Show when=move || tab.get() == Tab::Register>
                        <label>
                            "Name"
                            <input
                                type="text"
                                prop:value=move || name.get()
                                on:input=move |ev| name.set(event_target_value(&ev))
                            />
                        </label>
                        <FieldMessage errors=field_errors field="name" />
                    </Show>
                    <label>
                        "Email"
                        <input
                            type="email"
                            autocomplete="username"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                    </label>
                    <FieldMessage errors=field_errors field="email" />
                    <label>
                        "Password"
                        <input
                            type="password"
                            autocomplete=move || if tab.get() == Tab::Register { "new-password" } else { "current-password" }
                            prop:value=move || password.get()
                            on:input=move |ev| password.set(event_target_value(&ev))
                        />
                    </label>
                    <FieldMessage errors=field_errors field="password" />
                    <button type="submit" class="primary-btn" disabled=move || busy.get()>
                        {move || match (tab.get(), busy.get()) {
                            (Tab::SignIn, false) => "Sign in",
                            (Tab::SignIn, true) => "Signing in...",
                            (Tab::Register, false) => "Create account",
                            (Tab::Register, true) => "Creating account...",
                        }}
                    </button>
                </form>
            </div>
        </div>
    }
}
