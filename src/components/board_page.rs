//! Board Page Component
//!
//! Columns of task cards with drag-and-drop between and within columns.
//! Moves are sent to the server and the board re-fetched; nothing is
//! spliced locally ahead of the response.

use board_core::{CacheKey, ColumnGroup, ColumnTone, DragLocation, DragResult, DropOutcome};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{bind_global_listeners, create_dnd_signals, make_on_container_end_mouseenter, DndSignals, DragEnd};

use crate::components::{ErrorBanner, QuickAdd, TaskCard};
use crate::context::AppContext;
use crate::routes::Route;
use crate::store::{use_app_store, AppStateStoreFields};

fn drag_result(end: DragEnd) -> DragResult {
    DragResult {
        dragged_id: end.origin.item_id,
        source: DragLocation::new(end.origin.container_id, end.origin.index),
        destination: end.destination.map(|slot| DragLocation::new(slot.container_id, slot.index)),
    }
}

#[component]
fn BoardColumn(
    group: ColumnGroup,
    board_id: String,
    dnd: DndSignals,
    error: RwSignal<Option<String>>,
) -> impl IntoView {
    let column_id = group.column.id.clone();
    let tone = ColumnTone::of(&group.column);
    let len = group.tasks.len();
    let end_index = move || match dnd.dragging_read.get() {
        Some(origin) => leptos_dragdrop::end_slot_index(&origin, &column_id, len),
        None => len,
    };
    let end_column = group.column.id.clone();

    let cards = group
        .tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| {
            view! { <TaskCard task=task board_id=board_id.clone() index=index dnd=dnd error=error /> }
        })
        .collect_view();

    view! {
        <section class=format!("board-column {}", tone.css_class())>
            <header class="column-header">
                <h2>{group.column.name.clone()}</h2>
                <span class="column-count">{len}</span>
            </header>
            <div class="column-cards">
                {cards}
                <div
                    class=move || {
                        if dnd.is_over(&end_column, end_index()) { "column-end drop-target" } else { "column-end" }
                    }
                    on:mouseenter=make_on_container_end_mouseenter(dnd, group.column.id.clone(), len)
                    on:mouseleave=leptos_dragdrop::make_on_mouseleave(dnd)
                ></div>
            </div>
            <QuickAdd board_id=board_id.clone() column_id=group.column.id.clone() error=error />
        </section>
    }
}

#[component]
pub fn BoardPage(board_id: String) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let (loading, set_loading) = signal(true);
    let error = RwSignal::new(None::<String>);
    let board_id = StoredValue::new(board_id);

    store.board_view().set(None);

    // Load board and tasks when trigger changes
    Effect::new(move |_| {
        let _ = ctx.reload_trigger.get();
        let client = ctx.client();
        let id = board_id.get_value();
        spawn_local(async move {
            match client.board_view(&id).await {
                Ok(view) => {
                    log::debug!("[BOARD] loaded {} with {} columns", id, view.groups.len());
                    store.board_view().set(Some(view));
                }
                Err(e) => error.set(Some(ctx.error_message(&e))),
            }
            set_loading.set(false);
        });
    });

    let dnd = create_dnd_signals();
    let on_drop = move |end: DragEnd| {
        let result = drag_result(end);
        let client = ctx.client();
        let id = board_id.get_value();
        spawn_local(async move {
            match client.drop_task(&id, &result).await {
                Ok(DropOutcome::Moved(n)) => {
                    log::debug!("[BOARD] {} move(s) sent for {}", n, result.dragged_id);
                    ctx.reload();
                }
                Ok(DropOutcome::Queued) | Ok(DropOutcome::Ignored) => {}
                Err(e) => error.set(Some(ctx.error_message(&e))),
            }
        });
    };
    // Listeners are removed when the page is disposed
    let _listeners = StoredValue::new_local(bind_global_listeners(dnd, on_drop));

    let refresh = move |_| {
        let client = ctx.client();
        let id = board_id.get_value();
        client.invalidate(&CacheKey::Board(id.clone()));
        client.invalidate(&CacheKey::Tasks(id));
        set_loading.set(true);
        ctx.reload();
    };

    let title = move || {
        store
            .board_view()
            .with(|v| v.as_ref().map(|v| v.board.name.clone()))
            .unwrap_or_default()
    };

    view! {
        <div class="board-page">
            <div class="page-header">
                <a class="back-link" href=Route::Boards.to_hash()>"← Boards"</a>
                <h1>{title}</h1>
                <button class="secondary-btn" on:click=refresh disabled=move || loading.get()>
                    {move || if loading.get() { "Refreshing..." } else { "Refresh" }}
                </button>
            </div>
            <ErrorBanner error=error />

            {move || match store.board_view().get() {
                Some(view) => {
                    let id = board_id.get_value();
                    view! {
                        <div class="board-columns">
                            {view.groups.into_iter().map(|group| view! {
                                <BoardColumn group=group board_id=id.clone() dnd=dnd error=error />
                            }).collect_view()}
                        </div>
                    }.into_any()
                }
                None if loading.get() => view! { <div class="loading">"Loading board..."</div> }.into_any(),
                None => view! { <div class="empty-state">"Board not found."</div> }.into_any(),
            }}
        </div>
    }
}
