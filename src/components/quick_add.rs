//! Quick Add Component
//!
//! Per-column form for creating a task with a priority.

use board_core::{ApiError, Priority};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;

#[component]
pub fn QuickAdd(
    board_id: String,
    column_id: String,
    error: RwSignal<Option<String>>,
) -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let (title, set_title) = signal(String::new());
    let (priority, set_priority) = signal(Priority::default());
    let (field_error, set_field_error) = signal(None::<String>);
    let (busy, set_busy) = signal(false);

    let board_id = StoredValue::new(board_id);
    let column_id = StoredValue::new(column_id);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        set_busy.set(true);
        set_field_error.set(None);
        let client = ctx.client();
        let text = title.get_untracked();
        let chosen = priority.get_untracked();
        let board = board_id.get_value();
        let column = column_id.get_value();

        spawn_local(async move {
            match client.create_task(&board, &column, &text, chosen).await {
                Ok(task) => {
                    log::info!("[BOARD] created task {} in {}", task.id, column);
                    set_title.set(String::new());
                    set_priority.set(Priority::default());
                    ctx.reload();
                }
                Err(ApiError::Validation(errors)) => {
                    set_field_error.set(errors.get("title").map(str::to_string));
                }
                Err(e) => error.set(Some(ctx.error_message(&e))),
            }
            set_busy.set(false);
        });
    };

    view! {
        <form class="quick-add" on:submit=submit>
            <input
                type="text"
                placeholder="Add a task..."
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            <div class="priority-picker">
                {Priority::ALL.into_iter().map(|p| view! {
                    <button
                        type="button"
                        class=move || {
                            if priority.get() == p {
                                format!("priority-btn priority-{} active", p.as_str())
                            } else {
                                format!("priority-btn priority-{}", p.as_str())
                            }
                        }
                        on:click=move |_| set_priority.set(p)
                    >
                        {p.label()}
                    </button>
                }).collect_view()}
                <button type="submit" class="add-btn" disabled=move || busy.get()>"Add"</button>
            </div>
            {move || field_error.get().map(|m| view! { <div class="field-error">{m}</div> })}
        </form>
    }
}
