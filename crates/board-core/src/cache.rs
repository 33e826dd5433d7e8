//! Board State Cache
//!
//! Request-keyed cache of what the API returned. Mutations invalidate keys;
//! readers re-fetch whatever is stale. Each fetch takes a ticket so that a
//! slow response cannot overwrite the result of a newer query.

use std::collections::HashMap;

use crate::model::{Board, Task};

/// Identifies one cached query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `GET /api/boards`
    Boards,
    /// `GET /api/boards/{id}`
    Board(String),
    /// All task pages of a board
    Tasks(String),
}

/// Proof that a fetch was started; required to store its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Default, Clone, Copy)]
struct SlotMeta {
    /// Newest ticket handed out for this key
    latest_ticket: u64,
    /// Sequence number of the last invalidation
    invalidated_at: u64,
    /// Ticket of the stored value
    stored_ticket: u64,
}

impl SlotMeta {
    fn is_stale(&self) -> bool {
        self.invalidated_at > self.stored_ticket
    }
}

#[derive(Debug)]
struct Slot<T> {
    meta: SlotMeta,
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            meta: SlotMeta::default(),
            value: None,
        }
    }
}

impl<T> Slot<T> {
    fn fresh(&self) -> Option<&T> {
        if self.meta.is_stale() {
            None
        } else {
            self.value.as_ref()
        }
    }

    fn store(&mut self, ticket: FetchTicket, value: T) -> bool {
        if ticket.0 != self.meta.latest_ticket {
            return false;
        }
        self.meta.stored_ticket = ticket.0;
        self.value = Some(value);
        true
    }
}

/// In-memory cache of boards and task collections
#[derive(Debug, Default)]
pub struct BoardCache {
    boards: Slot<Vec<Board>>,
    board: HashMap<String, Slot<Board>>,
    tasks: HashMap<String, Slot<Vec<Task>>>,
    seq: u64,
}

impl BoardCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn meta_mut(&mut self, key: &CacheKey) -> &mut SlotMeta {
        match key {
            CacheKey::Boards => &mut self.boards.meta,
            CacheKey::Board(id) => &mut self.board.entry(id.clone()).or_default().meta,
            CacheKey::Tasks(id) => &mut self.tasks.entry(id.clone()).or_default().meta,
        }
    }

    // ========================
    // Reads
    // ========================

    /// Fresh board list, `None` when absent or stale
    pub fn boards(&self) -> Option<&Vec<Board>> {
        self.boards.fresh()
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.board.get(board_id).and_then(Slot::fresh)
    }

    pub fn tasks(&self, board_id: &str) -> Option<&Vec<Task>> {
        self.tasks.get(board_id).and_then(Slot::fresh)
    }

    /// Last known task list regardless of staleness
    pub fn peek_tasks(&self, board_id: &str) -> Option<&Vec<Task>> {
        self.tasks.get(board_id).and_then(|s| s.value.as_ref())
    }

    pub fn peek_board(&self, board_id: &str) -> Option<&Board> {
        self.board.get(board_id).and_then(|s| s.value.as_ref())
    }

    /// Column id to name across every board seen so far, stale or not
    pub fn column_names(&self) -> HashMap<String, String> {
        self.boards
            .value
            .iter()
            .flatten()
            .chain(self.board.values().filter_map(|s| s.value.as_ref()))
            .flat_map(|b| b.columns.iter())
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect()
    }

    pub fn is_stale(&self, key: &CacheKey) -> bool {
        match key {
            CacheKey::Boards => self.boards.fresh().is_none(),
            CacheKey::Board(id) => self.board(id).is_none(),
            CacheKey::Tasks(id) => self.tasks(id).is_none(),
        }
    }

    // ========================
    // Fetch Bookkeeping
    // ========================

    /// Start a fetch for `key`, superseding any fetch already running
    pub fn begin_fetch(&mut self, key: &CacheKey) -> FetchTicket {
        let seq = self.next_seq();
        self.meta_mut(key).latest_ticket = seq;
        FetchTicket(seq)
    }

    /// Store a board list; returns false if the fetch was superseded
    pub fn store_boards(&mut self, ticket: FetchTicket, boards: Vec<Board>) -> bool {
        self.boards.store(ticket, boards)
    }

    pub fn store_board(&mut self, ticket: FetchTicket, board: Board) -> bool {
        self.board
            .entry(board.id.clone())
            .or_default()
            .store(ticket, board)
    }

    pub fn store_tasks(&mut self, ticket: FetchTicket, board_id: &str, tasks: Vec<Task>) -> bool {
        self.tasks
            .entry(board_id.to_string())
            .or_default()
            .store(ticket, tasks)
    }

    // ========================
    // Invalidation
    // ========================

    /// Mark `key` stale; the old value stays readable through `peek_*`
    pub fn invalidate(&mut self, key: &CacheKey) {
        let seq = self.next_seq();
        self.meta_mut(key).invalidated_at = seq;
        log::debug!("cache invalidated: {:?}", key);
    }

    /// Invalidate a board and its task collection
    pub fn invalidate_board(&mut self, board_id: &str) {
        self.invalidate(&CacheKey::Board(board_id.to_string()));
        self.invalidate(&CacheKey::Tasks(board_id.to_string()));
    }

    /// Forget a key entirely
    pub fn remove(&mut self, key: &CacheKey) {
        match key {
            CacheKey::Boards => self.boards = Slot::default(),
            CacheKey::Board(id) => {
                self.board.remove(id);
            }
            CacheKey::Tasks(id) => {
                self.tasks.remove(id);
            }
        }
    }
}
