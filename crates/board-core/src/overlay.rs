//! Local Overlay Store
//!
//! Client-only state persisted beside, but never synchronized with, the
//! server: notes, timeline events, and per-task titles, labels and
//! priorities. Everything is JSON in an opaque key-value store and loading
//! is best-effort: missing or corrupt entries come back empty.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::Priority;

pub const NOTES_KEY: &str = "ambis.notes.v1";
pub const EVENTS_KEY: &str = "ambis.timeline.events.v1";
pub const TITLES_KEY: &str = "ambis.taskTitles.v1";
pub const LABELS_KEY: &str = "ambis.taskLabels.v1";
pub const PRIORITY_KEY: &str = "ambis.taskPriority.v1";

/// Oldest events beyond this are dropped
pub const MAX_EVENTS: usize = 2000;
/// Oldest notes beyond this are dropped
pub const MAX_NOTES: usize = 1000;

// ========================
// Key-Value Store
// ========================

/// Opaque string key-value persistence (browser local storage in the app)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store, used in tests and when browser storage is unavailable
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Read a JSON value; absent or unreadable data yields `T::default()`
pub fn load_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.get(key) {
        None => T::default(),
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("discarding corrupt local entry {}: {}", key, e);
            T::default()
        }),
    }
}

pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => log::warn!("failed to persist {}: {}", key, e),
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ========================
// Records
// ========================

/// Free-text note shown in the activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Which mutation a timeline event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskDeleted,
}

/// Locally recorded side effect of a successful task mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_column_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_column_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Event fields supplied by the caller; id and timestamp are filled in on record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub kind: EventKind,
    pub task_id: String,
    pub title: Option<String>,
    pub from_column_id: Option<String>,
    pub to_column_id: Option<String>,
    pub to_position: Option<u32>,
    pub board_id: Option<String>,
}

impl EventDraft {
    pub fn new(kind: EventKind, task_id: impl Into<String>) -> Self {
        Self {
            kind,
            task_id: task_id.into(),
            title: None,
            from_column_id: None,
            to_column_id: None,
            to_position: None,
            board_id: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn board(mut self, board_id: impl Into<String>) -> Self {
        self.board_id = Some(board_id.into());
        self
    }

    pub fn moved(mut self, from: Option<String>, to: impl Into<String>, position: u32) -> Self {
        self.from_column_id = from;
        self.to_column_id = Some(to.into());
        self.to_position = Some(position);
        self
    }

    pub fn column(mut self, column_id: impl Into<String>) -> Self {
        self.to_column_id = Some(column_id.into());
        self
    }
}

// ========================
// Overlay
// ========================

/// Client-only annotations and history, written through on every change
pub struct LocalOverlay {
    store: Rc<dyn KeyValueStore>,
    notes: Vec<Note>,
    events: Vec<TimelineEvent>,
    titles: HashMap<String, String>,
    labels: HashMap<String, Vec<String>>,
    priorities: HashMap<String, Priority>,
}

impl LocalOverlay {
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let notes = load_json(store.as_ref(), NOTES_KEY);
        let events = load_json(store.as_ref(), EVENTS_KEY);
        let titles = load_json(store.as_ref(), TITLES_KEY);
        let labels = load_json(store.as_ref(), LABELS_KEY);
        let priorities = load_json(store.as_ref(), PRIORITY_KEY);
        Self {
            store,
            notes,
            events,
            titles,
            labels,
            priorities,
        }
    }

    // --- notes ---

    /// Newest first
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn add_note(&mut self, content: impl Into<String>, at: DateTime<Utc>) -> Note {
        let note = Note {
            id: new_id(),
            content: content.into(),
            timestamp: at,
        };
        self.notes.insert(0, note.clone());
        self.notes.truncate(MAX_NOTES);
        save_json(self.store.as_ref(), NOTES_KEY, &self.notes);
        note
    }

    pub fn remove_note(&mut self, note_id: &str) {
        self.notes.retain(|n| n.id != note_id);
        save_json(self.store.as_ref(), NOTES_KEY, &self.notes);
    }

    pub fn clear_notes(&mut self) {
        self.notes.clear();
        save_json(self.store.as_ref(), NOTES_KEY, &self.notes);
    }

    // --- events ---

    /// Newest first
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn record_event(&mut self, draft: EventDraft, at: DateTime<Utc>) -> TimelineEvent {
        let event = TimelineEvent {
            id: new_id(),
            kind: draft.kind,
            task_id: draft.task_id,
            title: draft.title,
            from_column_id: draft.from_column_id,
            to_column_id: draft.to_column_id,
            to_position: draft.to_position,
            board_id: draft.board_id,
            timestamp: at,
        };
        self.events.insert(0, event.clone());
        self.events.truncate(MAX_EVENTS);
        save_json(self.store.as_ref(), EVENTS_KEY, &self.events);
        event
    }

    // --- titles ---

    pub fn title(&self, task_id: &str) -> Option<&str> {
        self.titles.get(task_id).map(String::as_str)
    }

    pub fn titles(&self) -> &HashMap<String, String> {
        &self.titles
    }

    pub fn set_title(&mut self, task_id: &str, title: &str) {
        self.titles.insert(task_id.to_string(), title.to_string());
        save_json(self.store.as_ref(), TITLES_KEY, &self.titles);
    }

    /// Merge many titles with a single write
    pub fn bulk_set_titles<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) {
        let mut changed = false;
        for (task_id, title) in entries {
            if self.titles.get(task_id).map(String::as_str) != Some(title) {
                self.titles.insert(task_id.to_string(), title.to_string());
                changed = true;
            }
        }
        if changed {
            save_json(self.store.as_ref(), TITLES_KEY, &self.titles);
        }
    }

    // --- labels ---

    pub fn labels(&self, task_id: &str) -> &[String] {
        self.labels.get(task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_labels(&self) -> &HashMap<String, Vec<String>> {
        &self.labels
    }

    /// Returns false if the task already had the label
    pub fn add_label(&mut self, task_id: &str, label: &str) -> bool {
        let current = self.labels.entry(task_id.to_string()).or_default();
        if current.iter().any(|l| l == label) {
            return false;
        }
        current.push(label.to_string());
        save_json(self.store.as_ref(), LABELS_KEY, &self.labels);
        true
    }

    pub fn remove_label(&mut self, task_id: &str, label: &str) {
        if let Some(current) = self.labels.get_mut(task_id) {
            current.retain(|l| l != label);
            save_json(self.store.as_ref(), LABELS_KEY, &self.labels);
        }
    }

    // --- priorities ---

    /// Stored priority, `Medium` when none was set
    pub fn priority(&self, task_id: &str) -> Priority {
        self.priorities.get(task_id).copied().unwrap_or_default()
    }

    pub fn set_priority(&mut self, task_id: &str, priority: Priority) {
        self.priorities.insert(task_id.to_string(), priority);
        save_json(self.store.as_ref(), PRIORITY_KEY, &self.priorities);
    }

    pub fn cycle_priority(&mut self, task_id: &str) -> Priority {
        let next = self.priority(task_id).next();
        self.set_priority(task_id, next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn overlay() -> (Rc<MemoryStore>, LocalOverlay) {
        let store = Rc::new(MemoryStore::new());
        let overlay = LocalOverlay::load(store.clone());
        (store, overlay)
    }

    #[test]
    fn test_event_cap_evicts_oldest() {
        let (_, mut overlay) = overlay();
        for i in 0..MAX_EVENTS {
            overlay.record_event(EventDraft::new(EventKind::TaskUpdated, format!("t{}", i)), at(i as i64));
        }
        assert_eq!(overlay.events().len(), MAX_EVENTS);
        assert_eq!(overlay.events().last().unwrap().task_id, "t0");

        overlay.record_event(EventDraft::new(EventKind::TaskMoved, "newest"), at(5000));
        assert_eq!(overlay.events().len(), MAX_EVENTS);
        assert_eq!(overlay.events()[0].task_id, "newest");
        assert_eq!(overlay.events().last().unwrap().task_id, "t1");
        assert!(overlay.events().iter().all(|e| e.task_id != "t0"));
    }

    #[test]
    fn test_note_cap() {
        let (_, mut overlay) = overlay();
        for i in 0..=MAX_NOTES {
            overlay.add_note(format!("note {}", i), at(i as i64));
        }
        assert_eq!(overlay.notes().len(), MAX_NOTES);
        assert_eq!(overlay.notes()[0].content, format!("note {}", MAX_NOTES));
    }

    #[test]
    fn test_state_survives_reload() {
        let (store, mut overlay) = overlay();
        overlay.add_note("remember the demo", at(0));
        overlay.record_event(
            EventDraft::new(EventKind::TaskMoved, "t1")
                .board("b1")
                .moved(Some("todo".into()), "done", 2),
            at(1),
        );
        overlay.set_title("t1", "Write docs");
        overlay.add_label("t1", "docs");
        overlay.set_priority("t1", Priority::High);

        let reloaded = LocalOverlay::load(store);
        assert_eq!(reloaded.notes()[0].content, "remember the demo");
        assert_eq!(reloaded.events()[0].to_column_id.as_deref(), Some("done"));
        assert_eq!(reloaded.events()[0].timestamp, at(1));
        assert_eq!(reloaded.title("t1"), Some("Write docs"));
        assert_eq!(reloaded.labels("t1"), ["docs".to_string()]);
        assert_eq!(reloaded.priority("t1"), Priority::High);
    }

    #[test]
    fn test_event_wire_format() {
        let (store, mut overlay) = overlay();
        overlay.record_event(EventDraft::new(EventKind::TaskCreated, "t9").column("todo"), at(0));
        let raw = store.get(EVENTS_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["type"], "task_created");
        assert_eq!(value[0]["taskId"], "t9");
        assert_eq!(value[0]["toColumnId"], "todo");
    }

    #[test]
    fn test_corrupt_entries_load_empty() {
        let store = Rc::new(MemoryStore::new());
        store.set(NOTES_KEY, "{not json");
        store.set(PRIORITY_KEY, r#"{"t1":"urgent"}"#);
        store.set(TITLES_KEY, r#"{"t1":"ok"}"#);
        let overlay = LocalOverlay::load(store);
        assert!(overlay.notes().is_empty());
        assert_eq!(overlay.priority("t1"), Priority::Medium);
        assert_eq!(overlay.title("t1"), Some("ok"));
    }

    #[test]
    fn test_labels_reject_duplicates() {
        let (_, mut overlay) = overlay();
        assert!(overlay.add_label("t1", "bug"));
        assert!(!overlay.add_label("t1", "bug"));
        assert!(overlay.add_label("t1", "ui"));
        overlay.remove_label("t1", "bug");
        assert_eq!(overlay.labels("t1"), ["ui".to_string()]);
        assert!(overlay.labels("unknown").is_empty());
    }

    #[test]
    fn test_priority_cycles_from_default() {
        let (_, mut overlay) = overlay();
        assert_eq!(overlay.cycle_priority("t1"), Priority::High);
        assert_eq!(overlay.cycle_priority("t1"), Priority::Low);
    }

    #[test]
    fn test_remove_and_clear_notes() {
        let (_, mut overlay) = overlay();
        let first = overlay.add_note("one", at(0));
        overlay.add_note("two", at(1));
        overlay.remove_note(&first.id);
        assert_eq!(overlay.notes().len(), 1);
        overlay.clear_notes();
        assert!(overlay.notes().is_empty());
    }
}
