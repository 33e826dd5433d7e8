//! BoardClient Integration Tests
//!
//! Drives the client against an in-memory board service.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use super::*;
use crate::model::{Column, TaskPage};
use crate::overlay::MemoryStore;
use crate::realtime::TaskNotice;
use crate::reorder::{DragLocation, MoveIntent};
use crate::session::TOKEN_KEY;
use crate::timeline::EntryKind;

// ========================
// Fake Service
// ========================

#[derive(Default)]
struct FakeApi {
    boards: RefCell<Vec<Board>>,
    tasks: RefCell<HashMap<String, Vec<Task>>>,
    calls: RefCell<Vec<String>>,
    token: RefCell<Option<String>>,
    fail_next: RefCell<Option<ApiError>>,
    login_body: RefCell<Value>,
    register_status: RefCell<HashMap<&'static str, u16>>,
    page_size: usize,
    repeat_cursor: bool,
    endless_cursor: bool,
    next_id: RefCell<u32>,
}

impl FakeApi {
    fn with_board(board: Board, tasks: Vec<Task>) -> Self {
        let api = FakeApi {
            page_size: 100,
            ..Default::default()
        };
        api.tasks.borrow_mut().insert(board.id.clone(), tasks);
        api.boards.borrow_mut().push(board);
        api
    }

    fn record(&self, call: impl Into<String>) -> ApiResult<()> {
        self.calls.borrow_mut().push(call.into());
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn fresh_id(&self) -> String {
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        format!("new-{}", next)
    }

    /// Server-side move: renumber the target column around the moved task
    fn apply_move(&self, intent: &MoveIntent) {
        let mut all = self.tasks.borrow_mut();
        let Some(tasks) = all.values_mut().find(|ts| ts.iter().any(|t| t.id == intent.task_id)) else {
            return;
        };
        let Some(pos) = tasks.iter().position(|t| t.id == intent.task_id) else {
            return;
        };
        let mut moved = tasks.remove(pos);
        moved.column_id = intent.to_column_id.clone();

        let mut column: Vec<Task> = tasks
            .iter()
            .filter(|t| t.column_id == intent.to_column_id)
            .cloned()
            .collect();
        column.sort_by_key(Task::sort_order);
        let at = (intent.to_position as usize).saturating_sub(1).min(column.len());
        column.insert(at, moved);

        tasks.retain(|t| t.column_id != intent.to_column_id);
        for (i, mut task) in column.into_iter().enumerate() {
            task.order = Some(i as i64);
            tasks.push(task);
        }
    }
}

#[async_trait(?Send)]
impl BoardApi for FakeApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        self.record("list_boards")?;
        Ok(self.boards.borrow().clone())
    }

    async fn get_board(&self, board_id: &str) -> ApiResult<Board> {
        self.record(format!("get_board {}", board_id))?;
        self.boards
            .borrow()
            .iter()
            .find(|b| b.id == board_id)
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, r#"{"error":"board not found"}"#))
    }

    async fn create_board(&self, board: &NewBoard) -> ApiResult<Board> {
        self.record(format!("create_board {}", board.name))?;
        let created = Board {
            id: self.fresh_id(),
            name: board.name.clone(),
            description: board.description.clone(),
            columns: board.columns.clone(),
            members: board.members.clone(),
            is_archived: false,
            owner_id: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.boards.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn update_board(&self, board_id: &str, patch: &BoardPatch) -> ApiResult<()> {
        self.record(format!("update_board {}", board_id))?;
        if let Some(board) = self.boards.borrow_mut().iter_mut().find(|b| b.id == board_id) {
            if let Some(name) = &patch.name {
                board.name = name.clone();
            }
        }
        Ok(())
    }

    async fn delete_board(&self, board_id: &str) -> ApiResult<()> {
        self.record(format!("delete_board {}", board_id))?;
        self.boards.borrow_mut().retain(|b| b.id != board_id);
        self.tasks.borrow_mut().remove(board_id);
        Ok(())
    }

    async fn list_tasks(&self, board_id: &str, query: &TaskQuery) -> ApiResult<TaskPage> {
        self.record(format!(
            "list_tasks {} limit={:?} cursor={:?}",
            board_id, query.limit, query.cursor
        ))?;
        let tasks = self.tasks.borrow().get(board_id).cloned().unwrap_or_default();
        let start: usize = query.cursor.as_deref().and_then(|c| c.parse().ok()).unwrap_or(0);
        let size = query.limit.map(|l| l as usize).unwrap_or(self.page_size).min(self.page_size);
        let end = (start + size).min(tasks.len());
        let next_cursor = if self.repeat_cursor {
            Some("again".to_string())
        } else if self.endless_cursor {
            Some(format!("{}", start + size))
        } else if end < tasks.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok(TaskPage {
            items: tasks[start.min(end)..end].to_vec(),
            next_cursor,
        })
    }

    async fn create_task(&self, board_id: &str, task: &NewTask) -> ApiResult<Task> {
        self.record(format!("create_task {} {}", board_id, task.title))?;
        let created = Task {
            id: self.fresh_id(),
            title: task.title.clone(),
            description: None,
            column_id: task.column_id.clone(),
            order: None,
            status: None,
        };
        self.tasks
            .borrow_mut()
            .entry(board_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_task_title(&self, task_id: &str, title: &str) -> ApiResult<()> {
        self.record(format!("update_task {} {}", task_id, title))?;
        for tasks in self.tasks.borrow_mut().values_mut() {
            for task in tasks.iter_mut().filter(|t| t.id == task_id) {
                task.title = title.to_string();
            }
        }
        Ok(())
    }

    async fn delete_task(&self, task_id: &str) -> ApiResult<()> {
        self.record(format!("delete_task {}", task_id))?;
        for tasks in self.tasks.borrow_mut().values_mut() {
            tasks.retain(|t| t.id != task_id);
        }
        Ok(())
    }

    async fn move_task(&self, intent: &MoveIntent) -> ApiResult<()> {
        self.record(format!(
            "move {} {} {}",
            intent.task_id, intent.to_column_id, intent.to_position
        ))?;
        // let other gestures run while this request is on the wire
        tokio::task::yield_now().await;
        self.apply_move(intent);
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<Value> {
        self.record(format!("login {}", credentials.email))?;
        Ok(self.login_body.borrow().clone())
    }

    async fn register_at(&self, path: &str, _registration: &Registration) -> ApiResult<()> {
        self.record(format!("register {}", path))?;
        match self.register_status.borrow().get(path).copied().unwrap_or(404) {
            200 | 201 => Ok(()),
            status => Err(ApiError::from_status(status, "")),
        }
    }
}

// ========================
// Fixtures
// ========================

fn task(id: &str, column: &str, order: i64) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {}", id),
        description: None,
        column_id: column.into(),
        order: Some(order),
        status: None,
    }
}

fn board_b1() -> Board {
    Board {
        id: "B1".into(),
        name: "Sprint".into(),
        description: None,
        columns: vec![
            Column::new("todo", "To Do", 0),
            Column::new("doing", "Doing", 1),
            Column::new("done", "Done", 2),
        ],
        members: Vec::new(),
        is_archived: false,
        owner_id: None,
        created_at: None,
        updated_at: None,
    }
}

fn setup(api: FakeApi) -> (Rc<FakeApi>, Rc<MemoryStore>, BoardClient) {
    setup_with_config(api, ClientConfig::default())
}

fn setup_with_config(api: FakeApi, config: ClientConfig) -> (Rc<FakeApi>, Rc<MemoryStore>, BoardClient) {
    let api = Rc::new(api);
    let store = Rc::new(MemoryStore::new());
    let client = BoardClient::new(api.clone(), store.clone(), config);
    (api, store, client)
}

fn drag(task: &str, from: (&str, usize), to: Option<(&str, usize)>) -> DragResult {
    DragResult {
        dragged_id: task.into(),
        source: DragLocation::new(from.0, from.1),
        destination: to.map(|(c, i)| DragLocation::new(c, i)),
    }
}

fn ids(view: &BoardView, column: &str) -> Vec<String> {
    view.group(column)
        .map(|g| g.tasks.iter().map(|t| t.id.clone()).collect())
        .unwrap_or_default()
}

// ========================
// Drag and Drop
// ========================

#[tokio::test]
async fn test_drag_to_other_column_end_to_end() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0), task("T2", "doing", 0)]);
    let (api, _, client) = setup(api);

    let view = client.board_view("B1").await.expect("load board");
    assert_eq!(ids(&view, "todo"), vec!["T1"]);

    let outcome = client
        .drop_task("B1", &drag("T1", ("todo", 0), Some(("doing", 0))))
        .await
        .expect("move");
    assert_eq!(outcome, DropOutcome::Moved(1));
    assert_eq!(api.count("move "), 1);
    assert!(api.calls().contains(&"move T1 doing 1".to_string()));

    let view = client.board_view("B1").await.expect("reload board");
    assert!(ids(&view, "todo").is_empty());
    assert_eq!(ids(&view, "doing"), vec!["T1", "T2"]);

    let feed = client.feed(&Utc);
    let entry = &feed[0].entries[0];
    assert_eq!(entry.kind, EntryKind::Event(EventKind::TaskMoved));
    assert_eq!(entry.content, "Task T1 moved to \"Doing\"");
}

#[tokio::test]
async fn test_cancelled_and_same_slot_drops_send_nothing() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0)]);
    let (api, _, client) = setup(api);
    client.board_view("B1").await.unwrap();

    let cancelled = client.drop_task("B1", &drag("T1", ("todo", 0), None)).await.unwrap();
    let same = client
        .drop_task("B1", &drag("T1", ("todo", 0), Some(("todo", 0))))
        .await
        .unwrap();
    assert_eq!(cancelled, DropOutcome::Ignored);
    assert_eq!(same, DropOutcome::Ignored);
    assert_eq!(api.count("move "), 0);
    assert!(client.feed(&Utc).is_empty());
}

#[tokio::test]
async fn test_rapid_drops_coalesce_to_newest() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0)]);
    let (api, _, client) = setup(api);
    client.board_view("B1").await.unwrap();

    let first = drag("T1", ("todo", 0), Some(("doing", 0)));
    let second = drag("T1", ("doing", 0), Some(("done", 0)));
    let third = drag("T1", ("doing", 0), Some(("todo", 0)));
    let (a, b, c) = tokio::join!(
        client.drop_task("B1", &first),
        client.drop_task("B1", &second),
        client.drop_task("B1", &third),
    );

    assert_eq!(a.unwrap(), DropOutcome::Moved(2));
    assert_eq!(b.unwrap(), DropOutcome::Queued);
    assert_eq!(c.unwrap(), DropOutcome::Queued);
    let moves: Vec<String> = api.calls().into_iter().filter(|c| c.starts_with("move ")).collect();
    assert_eq!(moves, vec!["move T1 doing 1", "move T1 todo 1"]);
    assert!(!client.is_move_pending("T1"));
}

#[tokio::test]
async fn test_failed_move_keeps_cache_and_releases_guard() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0)]);
    let (api, _, client) = setup(api);
    client.board_view("B1").await.unwrap();
    let listed = api.count("list_tasks");

    *api.fail_next.borrow_mut() = Some(ApiError::from_status(500, r#"{"error":"boom"}"#));
    let err = client
        .drop_task("B1", &drag("T1", ("todo", 0), Some(("done", 0))))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert!(!client.is_move_pending("T1"));
    assert!(client.feed(&Utc).is_empty());

    // cached tasks are still fresh, so no refetch
    let view = client.board_view("B1").await.unwrap();
    assert_eq!(ids(&view, "todo"), vec!["T1"]);
    assert_eq!(api.count("list_tasks"), listed);
}

// ========================
// Queries and Cache
// ========================

#[tokio::test]
async fn test_boards_are_cached_until_a_mutation() {
    let api = FakeApi::with_board(board_b1(), Vec::new());
    let (api, _, client) = setup(api);

    assert_eq!(client.boards().await.unwrap().len(), 1);
    assert_eq!(client.boards().await.unwrap().len(), 1);
    assert_eq!(api.count("list_boards"), 1);

    let created = client.create_board("  Launch  ", Some(String::new())).await.unwrap();
    assert_eq!(created.name, "Launch");
    assert!(created.description.is_none());
    let columns: Vec<&str> = created.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(columns, vec!["todo", "in-progress", "done"]);

    assert_eq!(client.boards().await.unwrap().len(), 2);
    assert_eq!(api.count("list_boards"), 2);
}

#[tokio::test]
async fn test_delete_board_forgets_it() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0)]);
    let (api, _, client) = setup(api);
    client.board_view("B1").await.unwrap();

    client.delete_board("B1").await.unwrap();
    assert!(client.boards().await.unwrap().is_empty());
    let err = client.board("B1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(api.count("get_board"), 2);
}

#[tokio::test]
async fn test_tasks_follow_cursor_pages() {
    let tasks = (0..5).map(|i| task(&format!("T{}", i), "todo", i)).collect();
    let mut api = FakeApi::with_board(board_b1(), tasks);
    api.page_size = 2;
    let config = ClientConfig {
        task_page_limit: 2,
        ..ClientConfig::default()
    };
    let (api, _, client) = setup_with_config(api, config);

    let all = client.tasks("B1").await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(api.count("list_tasks"), 3);
    assert_eq!(
        api.calls()[0],
        "list_tasks B1 limit=Some(2) cursor=None".to_string()
    );
}

#[tokio::test]
async fn test_repeated_cursor_stops_paging() {
    let mut api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0)]);
    api.repeat_cursor = true;
    let (api, _, client) = setup(api);

    let all = client.tasks("B1").await.unwrap();
    // first page plus the page fetched with the cursor seen once
    assert_eq!(api.count("list_tasks"), 2);
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_empty_page_with_fresh_cursor_stops_paging() {
    let tasks = (0..3).map(|i| task(&format!("T{}", i), "todo", i)).collect();
    let mut api = FakeApi::with_board(board_b1(), tasks);
    api.page_size = 2;
    api.endless_cursor = true;
    let config = ClientConfig {
        task_page_limit: 2,
        ..ClientConfig::default()
    };
    let (api, _, client) = setup_with_config(api, config);

    let all = client.tasks("B1").await.unwrap();
    assert_eq!(all.len(), 3);
    // two full pages, then one empty page that ends the listing
    assert_eq!(api.count("list_tasks"), 3);
}

#[tokio::test]
async fn test_server_event_marks_tasks_stale() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0)]);
    let (api, _, client) = setup(api);
    client.tasks("B1").await.unwrap();

    let event = ServerEvent::TaskUpdated(TaskNotice {
        task_id: Some("T1".into()),
        board_id: None,
    });
    assert!(client.apply_server_event(&event, Some("B1")));
    client.tasks("B1").await.unwrap();
    assert_eq!(api.count("list_tasks"), 2);
}

// ========================
// Task Mutations
// ========================

#[tokio::test]
async fn test_create_task_records_overlay_state() {
    let api = FakeApi::with_board(board_b1(), Vec::new());
    let (api, _, client) = setup(api);
    client.board_view("B1").await.unwrap();

    let created = client
        .create_task("B1", "todo", "  Write docs ", Priority::High)
        .await
        .unwrap();
    assert_eq!(created.title, "Write docs");
    assert_eq!(client.priority(&created.id), Priority::High);

    let view = client.board_view("B1").await.unwrap();
    assert_eq!(ids(&view, "todo"), vec![created.id.clone()]);
    assert_eq!(api.count("list_tasks"), 2);

    let feed = client.feed(&Utc);
    assert_eq!(feed[0].entries[0].header, "Task created");
    assert_eq!(feed[0].entries[0].content, "Write docs");
}

#[tokio::test]
async fn test_invalid_title_sends_nothing() {
    let api = FakeApi::with_board(board_b1(), Vec::new());
    let (api, _, client) = setup(api);

    let err = client.create_task("B1", "todo", "   ", Priority::Medium).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(api.count("create_task"), 0);
}

#[tokio::test]
async fn test_rename_with_same_title_is_noop() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0)]);
    let (api, _, client) = setup(api);
    client.tasks("B1").await.unwrap();

    assert!(!client.rename_task("B1", "T1", "Task T1 ").await.unwrap());
    assert_eq!(api.count("update_task"), 0);

    assert!(client.rename_task("B1", "T1", "Renamed").await.unwrap());
    assert_eq!(api.count("update_task"), 1);
    assert_eq!(client.tasks("B1").await.unwrap()[0].title, "Renamed");
}

#[tokio::test]
async fn test_rename_refetches_tasks_from_server() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0), task("T2", "todo", 1)]);
    let (api, _, client) = setup(api);
    client.board_view("B1").await.unwrap();
    assert_eq!(api.count("list_tasks"), 1);

    assert!(client.rename_task("B1", "T2", "Renamed").await.unwrap());
    let view = client.board_view("B1").await.unwrap();
    assert_eq!(api.count("list_tasks"), 2);
    let titles: Vec<_> = view.groups.iter().flat_map(|g| g.tasks.iter().map(|t| t.title.clone())).collect();
    assert!(titles.contains(&"Renamed".to_string()));
    assert!(titles.contains(&"Task T1".to_string()));
}

#[tokio::test]
async fn test_delete_task_keeps_title_in_feed() {
    let api = FakeApi::with_board(board_b1(), vec![task("T1", "todo", 0)]);
    let (_, _, client) = setup(api);
    client.tasks("B1").await.unwrap();

    client.delete_task("B1", "T1").await.unwrap();
    assert!(client.tasks("B1").await.unwrap().is_empty());
    let feed = client.feed(&Utc);
    assert_eq!(feed[0].entries[0].header, "Task deleted");
    assert_eq!(feed[0].entries[0].content, "Task T1");
}

// ========================
// Session
// ========================

#[tokio::test]
async fn test_login_stores_session() {
    let api = FakeApi::default();
    *api.login_body.borrow_mut() = json!({"data": {"token": "jwt-1", "userId": "u1"}});
    let (api, store, client) = setup(api);

    let credentials = Credentials {
        email: "a@b.co".into(),
        password: "secret".into(),
    };
    let session = client.login(&credentials).await.unwrap();
    assert_eq!(session.token, "jwt-1");
    assert!(client.is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("jwt-1"));
    assert_eq!(api.token.borrow().as_deref(), Some("jwt-1"));
}

#[tokio::test]
async fn test_login_rejects_bad_input_and_missing_token() {
    let api = FakeApi::default();
    *api.login_body.borrow_mut() = json!({"ok": true});
    let (api, _, client) = setup(api);

    let bad = Credentials {
        email: "nope".into(),
        password: String::new(),
    };
    assert!(matches!(client.login(&bad).await, Err(ApiError::Validation(_))));
    assert_eq!(api.count("login"), 0);

    let good = Credentials {
        email: "a@b.co".into(),
        password: "secret".into(),
    };
    assert_eq!(client.login(&good).await.unwrap_err(), ApiError::MissingToken);
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let api = FakeApi::with_board(board_b1(), Vec::new());
    let api = Rc::new(api);
    let store = Rc::new(MemoryStore::new());
    Session::new("stale", Some("u1".into())).save(store.as_ref());
    let client = BoardClient::new(api.clone(), store.clone(), ClientConfig::default());
    assert!(client.is_authenticated());
    assert_eq!(api.token.borrow().as_deref(), Some("stale"));

    *api.fail_next.borrow_mut() = Some(ApiError::Unauthorized);
    let err = client.boards().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!client.is_authenticated());
    assert!(store.get(TOKEN_KEY).is_none());
    assert!(api.token.borrow().is_none());
}

fn registration() -> Registration {
    Registration {
        name: "Ana".into(),
        email: "ana@example.com".into(),
        password: "secret1".into(),
    }
}

#[tokio::test]
async fn test_register_falls_through_missing_endpoints() {
    let api = FakeApi::default();
    api.register_status.borrow_mut().insert("/api/auth/register", 201);
    let (api, _, client) = setup(api);

    client.register(&registration()).await.unwrap();
    assert_eq!(api.calls(), vec!["register /api/register", "register /api/auth/register"]);
}

#[tokio::test]
async fn test_register_conflict_and_forbidden() {
    let api = FakeApi::default();
    api.register_status.borrow_mut().insert("/api/auth/register", 409);
    let (_, _, client) = setup(api);
    assert_eq!(client.register(&registration()).await.unwrap_err(), ApiError::EmailTaken);

    let api = FakeApi::default();
    api.register_status.borrow_mut().insert("/api/register", 403);
    let (_, _, client) = setup(api);
    assert_eq!(
        client.register(&registration()).await.unwrap_err(),
        ApiError::RegistrationDisabled
    );
}

#[tokio::test]
async fn test_register_stops_on_other_errors_and_reports_missing() {
    let api = FakeApi::default();
    api.register_status.borrow_mut().insert("/api/register", 500);
    let (api, _, client) = setup(api);
    let err = client.register(&registration()).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(api.count("register"), 1);

    let (api, _, client) = setup(FakeApi::default());
    assert_eq!(
        client.register(&registration()).await.unwrap_err(),
        ApiError::RegisterEndpointMissing
    );
    assert_eq!(api.count("register"), 4);
}

// ========================
// Overlay
// ========================

#[tokio::test]
async fn test_notes_and_labels() {
    let (_, _, client) = setup(FakeApi::default());

    assert!(matches!(client.add_note("hi"), Err(ApiError::Validation(_))));
    let note = client.add_note("  standup at ten  ").unwrap();
    assert_eq!(note.content, "standup at ten");
    assert_eq!(client.feed(&Utc)[0].entries[0].header, "Note added");

    assert!(client.add_label("T1", " bug "));
    assert!(!client.add_label("T1", "bug"));
    assert!(!client.add_label("T1", "  "));
    assert_eq!(client.labels("T1"), vec!["bug".to_string()]);

    client.clear_notes();
    assert!(client.notes().is_empty());
}
