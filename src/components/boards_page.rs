//! Boards Page Component
//!
//! Lists the user's boards with a create dialog and inline delete.

use board_core::{ApiError, Board, FieldErrors};
use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::{DeleteConfirmButton, ErrorBanner, Modal};
use crate::context::AppContext;
use crate::routes::Route;
use crate::store::{store_remove_board, use_app_store, AppStateStoreFields};

fn created_label(board: &Board) -> String {
    match board.created_at {
        Some(at) => format!("Created {}", at.with_timezone(&Local).format("%d %b %Y")),
        None => String::new(),
    }
}

fn member_label(count: usize) -> String {
    match count {
        1 => "1 member".to_string(),
        n => format!("{} members", n),
    }
}

/// Create-board dialog
#[component]
fn CreateBoardModal(#[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let name = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let field_errors = RwSignal::new(FieldErrors::default());
    let banner = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        field_errors.set(FieldErrors::default());
        let client = ctx.client();
        let name_value = name.get_untracked();
        let description_value = Some(description.get_untracked()).filter(|d| !d.trim().is_empty());

        spawn_local(async move {
            match client.create_board(&name_value, description_value).await {
                Ok(board) => {
                    log::info!("[BOARDS] created {}", board.id);
                    store.boards().write().push(board);
                    on_close.run(());
                    ctx.reload();
                }
                Err(ApiError::Validation(errors)) => field_errors.set(errors),
                Err(e) => banner.set(Some(ctx.error_message(&e))),
            }
            busy.set(false);
        });
    };

    view! {
        <Modal title="New board" on_close=on_close>
            <ErrorBanner error=banner />
            <form class="board-form" on:submit=submit>
                <label>
                    "Name"
                    <input
                        type="text"
                        autofocus=true
                        prop:value=move || name.get()
                        on:input=move |ev| name.set(event_target_value(&ev))
                    />
                </label>
                {move || field_errors.with(|e| e.get("name").map(str::to_string)).map(|m| view! {
                    <div class="field-error">{m}</div>
                })}
                <label>
                    "Description"
                    <textarea
                        rows="3"
                        prop:value=move || description.get()
                        on:input=move |ev| description.set(event_target_value(&ev))
                    ></textarea>
                </label>
                <div class="form-actions">
                    <button type="button" class="secondary-btn" on:click=move |_| on_close.run(())>"Cancel"</button>
                    <button type="submit" class="primary-btn" disabled=move || busy.get()>"Create"</button>
                </div>
            </form>
        </Modal>
    }
}

#[component]
pub fn BoardsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let (loading, set_loading) = signal(true);
    let banner = RwSignal::new(None::<String>);
    let (creating, set_creating) = signal(false);

    // Load boards when trigger changes
    Effect::new(move |_| {
        let _ = ctx.reload_trigger.get();
        let client = ctx.client();
        spawn_local(async move {
            match client.boards().await {
                Ok(boards) => {
                    log::debug!("[BOARDS] loaded {} boards", boards.len());
                    store.boards().set(boards);
                }
                Err(e) => banner.set(Some(ctx.error_message(&e))),
            }
            set_loading.set(false);
        });
    });

    let delete_board = move |board_id: String| {
        let client = ctx.client();
        spawn_local(async move {
            match client.delete_board(&board_id).await {
                Ok(()) => store_remove_board(&store, &board_id),
                Err(e) => banner.set(Some(ctx.error_message(&e))),
            }
        });
    };

    view! {
        <div class="boards-page">
            <div class="page-header">
                <h1>"Boards"</h1>
                <button class="primary-btn" on:click=move |_| set_creating.set(true)>"New board"</button>
            </div>
            <ErrorBanner error=banner />

            <Show when=move || loading.get() && store.boards().with(|b| b.is_empty())>
                <div class="loading">"Loading boards..."</div>
            </Show>
            <Show when=move || !loading.get() && store.boards().with(|b| b.is_empty())>
                <div class="empty-state">"No boards yet. Create one to get started."</div>
            </Show>

            <div class="board-list">
                <For
                    each=move || store.boards().get()
                    key=|board| (board.id.clone(), board.name.clone(), board.members.len())
                    children=move |board| {
                        let board_id = board.id.clone();
                        let href = Route::Board(board.id.clone()).to_hash();
                        let members = member_label(board.members.len());
                        let created = created_label(&board);
                        view! {
                            <div class="board-card">
                                <a class="board-card-link" href=href>
                                    <div class="board-card-name">{board.name.clone()}</div>
                                    {board.description.clone().map(|d| view! {
                                        <div class="board-card-description">{d}</div>
                                    })}
                                    <div class="board-card-meta">
                                        <span>{members}</span>
                                        <span>{created}</span>
                                    </div>
                                </a>
                                <DeleteConfirmButton
                                    button_class="delete-btn"
                                    prompt="Delete board?"
                                    on_confirm=move |_: ()| delete_board(board_id.clone())
                                />
                            </div>
                        }
                    }
                />
            </div>

            <Show when=move || creating.get()>
                <CreateBoardModal on_close=move |_: ()| set_creating.set(false) />
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_label() {
        assert_eq!(member_label(0), "0 members");
        assert_eq!(member_label(1), "1 member");
        assert_eq!(member_label(3), "3 members");
    }
}
