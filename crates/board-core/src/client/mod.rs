//! Board Client
//!
//! Single-threaded facade the UI talks to. It owns the board cache, the
//! in-flight move guard, the local overlay and the session, and drives an
//! injected `BoardApi`. State sits in `RefCell`s; no borrow is held across
//! an `.await`.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};

use crate::api::{BoardApi, REGISTER_PATHS};
use crate::cache::{BoardCache, CacheKey};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::grouping::BoardView;
use crate::guard::{Admission, InFlightMoves};
use crate::model::{Board, BoardPatch, Credentials, NewBoard, NewTask, Priority, Registration, Task, TaskQuery};
use crate::overlay::{EventDraft, EventKind, KeyValueStore, LocalOverlay, Note};
use crate::realtime::ServerEvent;
use crate::reorder::{resolve_drop, DragResult};
use crate::session::Session;
use crate::timeline::{build_feed, DayGroup, FeedContext};
use crate::validation;

#[cfg(test)]
mod tests;

/// What a finished drag gesture led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Cancelled or dropped back on its own slot
    Ignored,
    /// A move for this task is already in flight; replayed when it finishes
    Queued,
    /// Number of move requests that succeeded, follow-ups included
    Moved(usize),
}

pub struct BoardClient {
    api: Rc<dyn BoardApi>,
    store: Rc<dyn KeyValueStore>,
    config: ClientConfig,
    cache: RefCell<BoardCache>,
    moves: RefCell<InFlightMoves>,
    overlay: RefCell<LocalOverlay>,
    session: RefCell<Option<Session>>,
}

impl BoardClient {
    pub fn new(api: Rc<dyn BoardApi>, store: Rc<dyn KeyValueStore>, config: ClientConfig) -> Self {
        let session = Session::load(store.as_ref());
        api.set_token(session.as_ref().map(|s| s.token.clone()));
        let overlay = LocalOverlay::load(store.clone());
        Self {
            api,
            store,
            config,
            cache: RefCell::new(BoardCache::new()),
            moves: RefCell::new(InFlightMoves::new()),
            overlay: RefCell::new(overlay),
            session: RefCell::new(session),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Drop the session whenever the server rejects it
    fn check<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(ApiError::Unauthorized) = &result {
            log::warn!("request rejected with 401, clearing session");
            self.clear_session();
        }
        result
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ========================
    // Session
    // ========================

    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_some()
    }

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        validation::validate_login(credentials)?;
        let body = self.api.login(credentials).await.map_err(|e| match e {
            ApiError::Unauthorized => ApiError::Http {
                status: 401,
                message: "Invalid email or password".to_string(),
            },
            other => other,
        })?;
        let session = Session::from_login_response(&body)?;
        session.save(self.store.as_ref());
        self.api.set_token(Some(session.token.clone()));
        *self.session.borrow_mut() = Some(session.clone());
        log::info!("signed in as {}", session.user_id.as_deref().unwrap_or("unknown user"));
        Ok(session)
    }

    /// Register, trying each known endpoint path until one exists
    pub async fn register(&self, registration: &Registration) -> ApiResult<()> {
        validation::validate_registration(registration)?;
        for path in REGISTER_PATHS {
            match self.api.register_at(path, registration).await {
                Ok(()) => {
                    log::info!("registered via {}", path);
                    return Ok(());
                }
                Err(e) => match e.status() {
                    Some(404) => {
                        log::debug!("register endpoint {} not found, trying next", path);
                        continue;
                    }
                    Some(409) => return Err(ApiError::EmailTaken),
                    Some(403) => return Err(ApiError::RegistrationDisabled),
                    _ => return Err(e),
                },
            }
        }
        Err(ApiError::RegisterEndpointMissing)
    }

    pub fn logout(&self) {
        self.clear_session();
        log::info!("signed out");
    }

    fn clear_session(&self) {
        Session::clear(self.store.as_ref());
        self.api.set_token(None);
        *self.session.borrow_mut() = None;
        *self.cache.borrow_mut() = BoardCache::new();
    }

    // ========================
    // Queries
    // ========================

    pub async fn boards(&self) -> ApiResult<Vec<Board>> {
        if let Some(boards) = self.cache.borrow().boards() {
            return Ok(boards.clone());
        }
        let ticket = self.cache.borrow_mut().begin_fetch(&CacheKey::Boards);
        let boards = self.check(self.api.list_boards().await)?;
        self.cache.borrow_mut().store_boards(ticket, boards.clone());
        Ok(boards)
    }

    pub async fn board(&self, board_id: &str) -> ApiResult<Board> {
        if let Some(board) = self.cache.borrow().board(board_id) {
            return Ok(board.clone());
        }
        let ticket = self
            .cache
            .borrow_mut()
            .begin_fetch(&CacheKey::Board(board_id.to_string()));
        let board = self.check(self.api.get_board(board_id).await)?;
        self.cache.borrow_mut().store_board(ticket, board.clone());
        Ok(board)
    }

    /// Every task of a board, following cursor pagination
    pub async fn tasks(&self, board_id: &str) -> ApiResult<Vec<Task>> {
        if let Some(tasks) = self.cache.borrow().tasks(board_id) {
            return Ok(tasks.clone());
        }
        let ticket = self
            .cache
            .borrow_mut()
            .begin_fetch(&CacheKey::Tasks(board_id.to_string()));

        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();
        loop {
            let query = TaskQuery::page(self.config.task_page_limit, cursor.take());
            let page = self.check(self.api.list_tasks(board_id, &query).await)?;
            if page.items.is_empty() {
                // an empty page ends the listing whatever cursor came with it
                break;
            }
            items.extend(page.items);
            match page.next_cursor {
                Some(next) if seen.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    log::warn!("board {} returned cursor {} twice, stopping", board_id, next);
                    break;
                }
                None => break,
            }
        }

        self.overlay
            .borrow_mut()
            .bulk_set_titles(items.iter().map(|t| (t.id.as_str(), t.title.as_str())));
        self.cache.borrow_mut().store_tasks(ticket, board_id, items.clone());
        log::debug!("loaded {} tasks for board {}", items.len(), board_id);
        Ok(items)
    }

    /// Board with its tasks grouped into columns
    pub async fn board_view(&self, board_id: &str) -> ApiResult<BoardView> {
        let board = self.board(board_id).await?;
        let tasks = self.tasks(board_id).await?;
        Ok(BoardView::new(board, &tasks))
    }

    /// Mark a key stale so the next read goes to the server
    pub fn invalidate(&self, key: &CacheKey) {
        self.cache.borrow_mut().invalidate(key);
    }

    // ========================
    // Board Mutations
    // ========================

    pub async fn create_board(&self, name: &str, description: Option<String>) -> ApiResult<Board> {
        let name = validation::validate_board_name(name)?;
        let payload = NewBoard::with_default_columns(name, description);
        let board = self.check(self.api.create_board(&payload).await)?;
        self.cache.borrow_mut().invalidate(&CacheKey::Boards);
        log::info!("created board {}", board.id);
        Ok(board)
    }

    pub async fn update_board(&self, board_id: &str, patch: &BoardPatch) -> ApiResult<()> {
        if let Some(name) = &patch.name {
            validation::validate_board_name(name)?;
        }
        self.check(self.api.update_board(board_id, patch).await)?;
        let mut cache = self.cache.borrow_mut();
        cache.invalidate(&CacheKey::Boards);
        cache.invalidate(&CacheKey::Board(board_id.to_string()));
        Ok(())
    }

    pub async fn delete_board(&self, board_id: &str) -> ApiResult<()> {
        self.check(self.api.delete_board(board_id).await)?;
        let mut cache = self.cache.borrow_mut();
        cache.invalidate(&CacheKey::Boards);
        cache.remove(&CacheKey::Board(board_id.to_string()));
        cache.remove(&CacheKey::Tasks(board_id.to_string()));
        log::info!("deleted board {}", board_id);
        Ok(())
    }

    // ========================
    // Task Mutations
    // ========================

    /// Last known title: cached task first, then the overlay
    fn task_title(&self, board_id: &str, task_id: &str) -> Option<String> {
        let cached = self
            .cache
            .borrow()
            .peek_tasks(board_id)
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id))
            .map(|t| t.title.clone());
        cached.or_else(|| self.overlay.borrow().title(task_id).map(str::to_string))
    }

    pub async fn create_task(
        &self,
        board_id: &str,
        column_id: &str,
        title: &str,
        priority: Priority,
    ) -> ApiResult<Task> {
        let title = validation::validate_task_title(title)?;
        let payload = NewTask {
            title,
            column_id: column_id.to_string(),
        };
        let task = self.check(self.api.create_task(board_id, &payload).await)?;

        self.cache
            .borrow_mut()
            .invalidate(&CacheKey::Tasks(board_id.to_string()));
        let mut overlay = self.overlay.borrow_mut();
        overlay.set_title(&task.id, &task.title);
        overlay.set_priority(&task.id, priority);
        overlay.record_event(
            EventDraft::new(EventKind::TaskCreated, task.id.clone())
                .title(task.title.clone())
                .board(board_id)
                .column(column_id),
            Self::now(),
        );
        Ok(task)
    }

    /// Rename a task; returns false when the title did not change
    pub async fn rename_task(&self, board_id: &str, task_id: &str, title: &str) -> ApiResult<bool> {
        let title = validation::validate_task_title(title)?;
        if self.task_title(board_id, task_id).as_deref() == Some(title.as_str()) {
            return Ok(false);
        }
        self.check(self.api.update_task_title(task_id, &title).await)?;

        self.cache
            .borrow_mut()
            .invalidate(&CacheKey::Tasks(board_id.to_string()));
        let mut overlay = self.overlay.borrow_mut();
        overlay.set_title(task_id, &title);
        overlay.record_event(
            EventDraft::new(EventKind::TaskUpdated, task_id)
                .title(title)
                .board(board_id),
            Self::now(),
        );
        Ok(true)
    }

    pub async fn delete_task(&self, board_id: &str, task_id: &str) -> ApiResult<()> {
        let title = self.task_title(board_id, task_id);
        self.check(self.api.delete_task(task_id).await)?;

        self.cache
            .borrow_mut()
            .invalidate(&CacheKey::Tasks(board_id.to_string()));
        let mut draft = EventDraft::new(EventKind::TaskDeleted, task_id).board(board_id);
        if let Some(title) = title {
            draft = draft.title(title);
        }
        self.overlay.borrow_mut().record_event(draft, Self::now());
        Ok(())
    }

    /// Turn a finished drag into move requests
    ///
    /// A drop for a task whose move is still pending is queued and replayed
    /// by the call that owns the pending request. On failure the queue is
    /// dropped and nothing local changes.
    pub async fn drop_task(&self, board_id: &str, result: &DragResult) -> ApiResult<DropOutcome> {
        let Some(intent) = resolve_drop(result) else {
            return Ok(DropOutcome::Ignored);
        };
        let task_id = intent.task_id.clone();
        let admission = self.moves.borrow_mut().admit(intent.clone());
        let mut token = match admission {
            Admission::Issue(token) => token,
            Admission::Queued => {
                log::debug!("move for task {} queued behind pending request", task_id);
                return Ok(DropOutcome::Queued);
            }
        };

        let title = self.task_title(board_id, &task_id);
        let mut from = Some(result.source.column_id.clone());
        let mut current = intent;
        let mut moved = 0;
        loop {
            let sent = self.check(self.api.move_task(&current).await);
            if let Err(e) = sent {
                self.moves.borrow_mut().abort(&task_id, token);
                log::warn!("moving task {} failed: {}", task_id, e);
                return Err(e);
            }
            moved += 1;

            self.cache
                .borrow_mut()
                .invalidate(&CacheKey::Tasks(board_id.to_string()));
            let mut draft = EventDraft::new(EventKind::TaskMoved, task_id.clone())
                .board(board_id)
                .moved(from.take(), current.to_column_id.clone(), current.to_position);
            if let Some(title) = &title {
                draft = draft.title(title.clone());
            }
            self.overlay.borrow_mut().record_event(draft, Self::now());

            let next = self.moves.borrow_mut().complete(&task_id, token);
            match next {
                Some((follow_up, next_token)) => {
                    from = Some(current.to_column_id.clone());
                    current = follow_up;
                    token = next_token;
                }
                None => break,
            }
        }
        Ok(DropOutcome::Moved(moved))
    }

    pub fn is_move_pending(&self, task_id: &str) -> bool {
        self.moves.borrow().is_pending(task_id)
    }

    // ========================
    // Realtime
    // ========================

    /// Invalidate whatever a server notification makes stale
    pub fn apply_server_event(&self, event: &ServerEvent, current_board: Option<&str>) -> bool {
        let keys = event.invalidations(current_board);
        let mut cache = self.cache.borrow_mut();
        for key in &keys {
            cache.invalidate(key);
        }
        !keys.is_empty()
    }

    // ========================
    // Local Overlay
    // ========================

    pub fn notes(&self) -> Vec<Note> {
        self.overlay.borrow().notes().to_vec()
    }

    pub fn add_note(&self, content: &str) -> ApiResult<Note> {
        let content = validation::validate_note(content)?;
        Ok(self.overlay.borrow_mut().add_note(content, Self::now()))
    }

    pub fn remove_note(&self, note_id: &str) {
        self.overlay.borrow_mut().remove_note(note_id);
    }

    pub fn clear_notes(&self) {
        self.overlay.borrow_mut().clear_notes();
    }

    pub fn priority(&self, task_id: &str) -> Priority {
        self.overlay.borrow().priority(task_id)
    }

    pub fn set_priority(&self, task_id: &str, priority: Priority) {
        self.overlay.borrow_mut().set_priority(task_id, priority);
    }

    pub fn cycle_priority(&self, task_id: &str) -> Priority {
        self.overlay.borrow_mut().cycle_priority(task_id)
    }

    pub fn labels(&self, task_id: &str) -> Vec<String> {
        self.overlay.borrow().labels(task_id).to_vec()
    }

    /// Returns false for blank or duplicate labels
    pub fn add_label(&self, task_id: &str, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() {
            return false;
        }
        self.overlay.borrow_mut().add_label(task_id, label)
    }

    pub fn remove_label(&self, task_id: &str, label: &str) {
        self.overlay.borrow_mut().remove_label(task_id, label);
    }

    /// Day-grouped activity feed in time zone `tz`
    pub fn feed<Tz: TimeZone>(&self, tz: &Tz) -> Vec<DayGroup> {
        let column_names = self.cache.borrow().column_names();
        let overlay = self.overlay.borrow();
        let ctx = FeedContext {
            titles: overlay.titles(),
            labels: overlay.all_labels(),
            column_names: &column_names,
        };
        build_feed(overlay.events(), overlay.notes(), &ctx, tz)
    }
}
