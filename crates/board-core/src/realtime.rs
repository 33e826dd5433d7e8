//! Realtime Events
//!
//! JSON frames exchanged over the board WebSocket, and the cache keys each
//! server notification makes stale.
//!
//! Frames look like `{"event": "task_moved", "data": {...}}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;

/// Task reference carried by task notifications
///
/// Servers send either a slim `{taskId, boardId}` or the full task record,
/// so `id` is accepted as the task id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNotice {
    #[serde(default, alias = "id")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub board_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardNotice {
    #[serde(default, alias = "id")]
    pub board_id: Option<String>,
}

/// Server to client notification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    TaskCreated(TaskNotice),
    TaskUpdated(TaskNotice),
    TaskMoved(TaskNotice),
    TaskDeleted(TaskNotice),
    BoardUpdated(BoardNotice),
}

impl ServerEvent {
    /// Decode a text frame; unknown or malformed frames yield `None`
    pub fn parse(frame: &str) -> Option<Self> {
        match serde_json::from_str(frame) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("ignoring socket frame ({}): {}", e, frame);
                None
            }
        }
    }

    /// Cache keys to mark stale
    ///
    /// Notifications without a board id are attributed to the board being
    /// viewed, if any.
    pub fn invalidations(&self, current_board: Option<&str>) -> Vec<CacheKey> {
        match self {
            ServerEvent::TaskCreated(n)
            | ServerEvent::TaskUpdated(n)
            | ServerEvent::TaskMoved(n)
            | ServerEvent::TaskDeleted(n) => n
                .board_id
                .as_deref()
                .or(current_board)
                .map(|id| vec![CacheKey::Tasks(id.to_string())])
                .unwrap_or_default(),
            ServerEvent::BoardUpdated(n) => {
                let mut keys = vec![CacheKey::Boards];
                if let Some(id) = n.board_id.as_deref().or(current_board) {
                    keys.push(CacheKey::Board(id.to_string()));
                }
                keys
            }
        }
    }
}

/// Client to server frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientFrame {
    JoinBoard(String),
    LeaveBoard(String),
}

impl ClientFrame {
    pub fn to_json(&self) -> String {
        // a tagged enum of strings always serializes
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ========================
// Reconnect Backoff
// ========================

pub const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
pub const BACKOFF_MAX: Duration = Duration::from_secs(30);

/// Exponential reconnect delay: 1s, 2s, 4s ... capped at 30s
#[derive(Debug, Clone, Default)]
pub struct Backoff {
    attempt: u32,
}

impl Backoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u32.checked_shl(self.attempt).unwrap_or(u32::MAX);
        self.attempt = self.attempt.saturating_add(1);
        BACKOFF_INITIAL.saturating_mul(factor).min(BACKOFF_MAX)
    }

    /// Call once a connection is established
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
