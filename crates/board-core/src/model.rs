//! Board Models
//!
//! Data structures matching the remote board API, plus the client-only
//! annotations (priority) that live beside them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size the server applies when `limit` is omitted
pub const DEFAULT_PAGE_LIMIT: u32 = 30;
/// Largest page size the server accepts
pub const MAX_PAGE_LIMIT: u32 = 100;

// ========================
// Server Entities
// ========================

/// A column inside a board; its id doubles as the drop-target key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Column {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order: Some(order),
        }
    }

    /// Sort key; a missing order sorts as 0
    pub fn sort_order(&self) -> i64 {
        self.order.unwrap_or(0)
    }
}

/// Board data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Board {
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }
}

/// Server-side workflow status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Planned,
    InProgress,
    Done,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Planned => "planned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Unknown => "unknown",
        }
    }
}

/// Task data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl Task {
    /// Sort key; a missing order sorts as 0
    pub fn sort_order(&self) -> i64 {
        self.order.unwrap_or(0)
    }
}

/// One page of tasks from `GET /api/boards/{id}/tasks`
///
/// Servers answer either with `{items, nextCursor}` or with a bare array;
/// any other shape decodes as an empty page. Items that do not decode as a
/// task are skipped so one bad row never hides the rest of the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TaskPageWire")]
pub struct TaskPage {
    pub items: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskPageWire {
    Bare(Vec<serde_json::Value>),
    Paged {
        #[serde(default)]
        items: Vec<serde_json::Value>,
        #[serde(default, rename = "nextCursor")]
        next_cursor: Option<String>,
    },
    Other(serde_json::Value),
}

fn decode_tasks(raw: Vec<serde_json::Value>) -> Vec<Task> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Task>(value) {
            Ok(task) => Some(task),
            Err(e) => {
                log::warn!("skipping malformed task in page: {}", e);
                None
            }
        })
        .collect()
}

impl From<TaskPageWire> for TaskPage {
    fn from(wire: TaskPageWire) -> Self {
        match wire {
            TaskPageWire::Bare(items) => TaskPage {
                items: decode_tasks(items),
                next_cursor: None,
            },
            TaskPageWire::Paged { items, next_cursor } => TaskPage {
                items: decode_tasks(items),
                next_cursor,
            },
            TaskPageWire::Other(_) => TaskPage::default(),
        }
    }
}

// ========================
// Request Payloads
// ========================

/// Filters and pagination for task listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl TaskQuery {
    pub fn page(limit: u32, cursor: Option<String>) -> Self {
        Self {
            limit: Some(limit),
            cursor,
            ..Default::default()
        }
    }

    /// Query-string pairs; `limit` is clamped to what the server accepts
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(assignee) = &self.assignee {
            pairs.push(("assignee", assignee.clone()));
        }
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.clamp(1, MAX_PAGE_LIMIT).to_string()));
        }
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.clone()));
        }
        pairs
    }
}

/// Body of `POST /api/boards`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBoard {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<Column>,
    pub members: Vec<String>,
}

impl NewBoard {
    /// A board with the standard To Do / In Progress / Done columns
    pub fn with_default_columns(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description: description.filter(|d| !d.trim().is_empty()),
            columns: vec![
                Column::new("todo", "To Do", 0),
                Column::new("in-progress", "In Progress", 1),
                Column::new("done", "Done", 2),
            ],
            members: Vec::new(),
        }
    }
}

/// Body of `PATCH /api/boards/{id}`; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
}

/// Body of `POST /api/boards/{id}/tasks`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub column_id: String,
}

/// Body of `POST /api/login`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of the register endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

// ========================
// Client-only Annotations
// ========================

/// Task priority, kept in local storage only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Next priority when the badge is clicked
    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Small",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}
