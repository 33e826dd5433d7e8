//! Timeline Page Component
//!
//! Note form and the local activity feed, grouped by day.

use board_core::timeline::{format_day_heading, format_relative};
use board_core::{ApiError, EntryKind, FeedEntry};
use chrono::{Local, Utc};
use gloo_timers::callback::Interval;
use leptos::prelude::*;

use crate::components::ErrorBanner;
use crate::context::AppContext;
use crate::store::{store_touch_overlay, use_app_store, AppStateStoreFields};

/// How often relative times are re-rendered
const CLOCK_TICK_MS: u32 = 60_000;

#[component]
fn FeedItem(entry: FeedEntry, now: ReadSignal<chrono::DateTime<Utc>>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let timestamp = entry.timestamp;
    let is_note = entry.kind == EntryKind::Note;
    let entry_id = entry.id.clone();
    let class = format!(
        "feed-entry {} {}",
        if is_note { "feed-note" } else { "feed-event" },
        entry.tone.css_class()
    );

    view! {
        <li class=class>
            <div class="feed-entry-header">
                <span class="feed-entry-title">{entry.header}</span>
                <span class="feed-entry-time" title=timestamp.with_timezone(&Local).to_rfc2822()>
                    {move || format_relative(timestamp, now.get(), &Local)}
                </span>
                {is_note.then(|| view! {
                    <button
                        class="delete-btn"
                        title="Remove note"
                        on:click=move |_| {
                            ctx.client().remove_note(&entry_id);
                            store_touch_overlay(&store);
                        }
                    >
                        "×"
                    </button>
                })}
            </div>
            <div class="feed-entry-content">{entry.content.clone()}</div>
            {(!entry.labels.is_empty()).then(|| view! {
                <div class="task-labels">
                    {entry.labels.iter().map(|l| view! { <span class="label-chip">{l.clone()}</span> }).collect_view()}
                </div>
            })}
        </li>
    }
}

#[component]
pub fn TimelinePage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let (draft, set_draft) = signal(String::new());
    let (field_error, set_field_error) = signal(None::<String>);
    let (confirm_clear, set_confirm_clear) = signal(false);
    let banner = RwSignal::new(None::<String>);

    let (now, set_now) = signal(Utc::now());
    let _clock = StoredValue::new_local(Interval::new(CLOCK_TICK_MS, move || {
        set_now.try_set(Utc::now());
    }));

    // Rebuild the feed whenever local data changes
    Effect::new(move |_| {
        let _ = store.overlay_version().get();
        let _ = ctx.reload_trigger.get();
        let feed = ctx.client().feed(&Local);
        store.feed().set(feed);
    });

    let add_note = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match ctx.client().add_note(&draft.get_untracked()) {
            Ok(note) => {
                log::debug!("[TIMELINE] note {} added", note.id);
                set_draft.set(String::new());
                set_field_error.set(None);
                set_now.set(Utc::now());
                store_touch_overlay(&store);
            }
            Err(ApiError::Validation(errors)) => {
                set_field_error.set(errors.get("content").map(str::to_string));
            }
            Err(e) => banner.set(Some(e.to_string())),
        }
    };

    let clear_notes = move |_| {
        ctx.client().clear_notes();
        set_confirm_clear.set(false);
        store_touch_overlay(&store);
    };

    view! {
        <div class="timeline-page">
            <div class="page-header">
                <h1>"Timeline"</h1>
                <Show
                    when=move || confirm_clear.get()
                    fallback=move || view! {
                        <button class="secondary-btn" on:click=move |_| set_confirm_clear.set(true)>"Clear notes"</button>
                    }
                >
                    <span class="delete-confirm">
                        <span class="delete-confirm-text">"Remove all notes?"</span>
                        <button class="confirm-btn" on:click=clear_notes>"✓"</button>
                        <button class="cancel-btn" on:click=move |_| set_confirm_clear.set(false)>"✗"</button>
                    </span>
                </Show>
            </div>
            <ErrorBanner error=banner />

            <form class="note-form" on:submit=add_note>
                <textarea
                    rows="3"
                    placeholder="Write a note..."
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                ></textarea>
                {move || field_error.get().map(|m| view! { <div class="field-error">{m}</div> })}
                <button type="submit" class="primary-btn">"Add note"</button>
            </form>

            <Show
                when=move || store.feed().with(|f| !f.is_empty())
                fallback=|| view! { <div class="empty-state">"Nothing here yet. Activity on your boards shows up here."</div> }
            >
                <div class="feed">
                    <For
                        each=move || store.feed().get()
                        key=|group| (group.day, group.entries.len(), group.entries.first().map(|e| e.id.clone()))
                        children=move |group| view! {
                            <section class="feed-day">
                                <h2 class="feed-day-heading">{format_day_heading(group.day)}</h2>
                                <ul class="feed-entries">
                                    {group.entries.into_iter().map(|entry| view! {
                                        <FeedItem entry=entry now=now />
                                    }).collect_view()}
                                </ul>
                            </section>
                        }
                    />
                </div>
            </Show>
        </div>
    }
}
