//! Task Card Component
//!
//! A draggable card with inline title editing, priority badge, label chips
//! and delete confirmation.

use board_core::{ApiError, Task};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{make_on_item_mouseenter, make_on_mousedown, make_on_mouseleave, DndSignals, DragOrigin, DropSlot};

use crate::components::DeleteConfirmButton;
use crate::context::AppContext;
use crate::store::{store_remove_task, store_touch_overlay, use_app_store, AppStateStoreFields};

#[component]
pub fn TaskCard(
    task: Task,
    board_id: String,
    index: usize,
    dnd: DndSignals,
    error: RwSignal<Option<String>>,
) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let task_id = StoredValue::new(task.id.clone());
    let board_id = StoredValue::new(board_id);
    let current = StoredValue::new(task.clone());

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(task.title.clone());
    let (adding_label, set_adding_label) = signal(false);
    let (label_draft, set_label_draft) = signal(String::new());

    // Client-only annotations re-read whenever the overlay changes
    let priority = move || {
        let _ = store.overlay_version().get();
        ctx.client().priority(&task_id.get_value())
    };
    let labels = move || {
        let _ = store.overlay_version().get();
        ctx.client().labels(&task_id.get_value())
    };
    let pending = move || {
        let _ = ctx.reload_trigger.get();
        let _ = dnd.dragging_read.get();
        ctx.client().is_move_pending(&task_id.get_value())
    };

    let origin = DragOrigin {
        item_id: task.id.clone(),
        container_id: task.column_id.clone(),
        index,
    };
    let slot = DropSlot {
        container_id: task.column_id.clone(),
        index,
    };
    let column_id = task.column_id.clone();

    let save_title = move || {
        if !editing.get_untracked() {
            return;
        }
        set_editing.set(false);
        let client = ctx.client();
        let title = draft.get_untracked();
        let board = board_id.get_value();
        let id = task_id.get_value();
        spawn_local(async move {
            match client.rename_task(&board, &id, &title).await {
                Ok(true) => {
                    // the board is re-fetched; only the edit draft is kept here
                    current.update_value(|t| t.title = title.trim().to_string());
                    ctx.reload();
                }
                Ok(false) => {}
                Err(ApiError::Validation(errors)) => {
                    set_draft.set(current.with_value(|t| t.title.clone()));
                    error.set(Some(errors.to_string()));
                }
                Err(e) => {
                    set_draft.set(current.with_value(|t| t.title.clone()));
                    error.set(Some(ctx.error_message(&e)));
                }
            }
        });
    };

    let cancel_edit = move || {
        set_draft.set(current.with_value(|t| t.title.clone()));
        set_editing.set(false);
    };

    let cycle_priority = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let next = ctx.client().cycle_priority(&task_id.get_value());
        log::debug!("[BOARD] priority of {} is now {}", task_id.get_value(), next.as_str());
        store_touch_overlay(&store);
    };

    let add_label = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if ctx.client().add_label(&task_id.get_value(), &label_draft.get_untracked()) {
            store_touch_overlay(&store);
        }
        set_label_draft.set(String::new());
        set_adding_label.set(false);
    };

    let delete = move |_: ()| {
        let client = ctx.client();
        let board = board_id.get_value();
        let id = task_id.get_value();
        spawn_local(async move {
            match client.delete_task(&board, &id).await {
                Ok(()) => {
                    store_remove_task(&store, &id);
                    ctx.reload();
                }
                Err(e) => error.set(Some(ctx.error_message(&e))),
            }
        });
    };

    let start_edit = move |_| {
        if !dnd.drag_just_ended_read.get_untracked() {
            set_editing.set(true);
        }
    };

    let card_id = task.id.clone();
    let slot_column = column_id.clone();

    view! {
        <div
            class=move || {
                let mut class = String::from("task-card");
                if dnd.is_dragging_item(&card_id) { class.push_str(" dragging"); }
                if dnd.is_over(&slot_column, index) { class.push_str(" drop-target"); }
                if pending() { class.push_str(" move-pending"); }
                class
            }
            on:mousedown=make_on_mousedown(dnd, origin)
            on:mouseenter=make_on_item_mouseenter(dnd, slot)
            on:mouseleave=make_on_mouseleave(dnd)
        >
            <div class="task-card-header">
                <button
                    class=move || format!("priority-badge priority-{}", priority().as_str())
                    title="Change priority"
                    on:click=cycle_priority
                >
                    {move || priority().label()}
                </button>
                <DeleteConfirmButton button_class="delete-btn" prompt="Delete task?" on_confirm=delete />
            </div>

            <Show
                when=move || editing.get()
                fallback=move || view! {
                    <div class="task-title" title="Click to edit" on:click=start_edit>
                        {move || draft.get()}
                    </div>
                }
            >
                <input
                    class="task-title-input"
                    type="text"
                    autofocus=true
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                    on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                        "Enter" => save_title(),
                        "Escape" => cancel_edit(),
                        _ => {}
                    }
                    on:blur=move |_| save_title()
                />
            </Show>

            <div class="task-labels">
                <For
                    each=labels
                    key=|label| label.clone()
                    children=move |label| {
                        let text = label.clone();
                        view! {
                            <span class="label-chip">
                                {text}
                                <button
                                    class="label-remove"
                                    on:click=move |ev| {
                                        ev.stop_propagation();
                                        ctx.client().remove_label(&task_id.get_value(), &label);
                                        store_touch_overlay(&store);
                                    }
                                >
                                    "×"
                                </button>
                            </span>
                        }
                    }
                />
                <Show
                    when=move || adding_label.get()
                    fallback=move || view! {
                        <button class="label-add" on:click=move |_| set_adding_label.set(true)>"+ label"</button>
                    }
                >
                    <form class="label-form" on:submit=add_label>
                        <input
                            type="text"
                            autofocus=true
                            placeholder="Label"
                            prop:value=move || label_draft.get()
                            on:input=move |ev| set_label_draft.set(event_target_value(&ev))
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                if ev.key() == "Escape" {
                                    set_adding_label.set(false);
                                }
                            }
                        />
                    </form>
                </Show>
            </div>
        </div>
    }
}
