//! Column Grouping
//!
//! Derives the per-column task lists shown on a board from the flat task
//! collection returned by the API.

use std::collections::HashMap;

use crate::model::{Board, Column, Task};

/// Tasks of one column in display order
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGroup {
    pub column: Column,
    pub tasks: Vec<Task>,
}

/// A board together with its grouped tasks
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub board: Board,
    pub groups: Vec<ColumnGroup>,
}

impl BoardView {
    pub fn new(board: Board, tasks: &[Task]) -> Self {
        let groups = group_tasks(&board, tasks);
        Self { board, groups }
    }

    pub fn group(&self, column_id: &str) -> Option<&ColumnGroup> {
        self.groups.iter().find(|g| g.column.id == column_id)
    }
}

/// Columns in left-to-right order
///
/// Stable sort ascending by `order` (missing = 0); equal orders keep the
/// order the server sent them in.
pub fn sorted_columns(board: &Board) -> Vec<&Column> {
    let mut columns: Vec<&Column> = board.columns.iter().collect();
    columns.sort_by_key(|c| c.sort_order());
    columns
}

/// Group tasks under their columns
///
/// Every column gets a group, even an empty one. Tasks pointing at a column
/// the board does not have are left out.
pub fn group_tasks(board: &Board, tasks: &[Task]) -> Vec<ColumnGroup> {
    let mut by_column: HashMap<&str, Vec<Task>> = board
        .columns
        .iter()
        .map(|c| (c.id.as_str(), Vec::new()))
        .collect();

    for task in tasks {
        match by_column.get_mut(task.column_id.as_str()) {
            Some(bucket) => bucket.push(task.clone()),
            None => log::debug!(
                "task {} references unknown column {}, skipped",
                task.id,
                task.column_id
            ),
        }
    }

    sorted_columns(board)
        .into_iter()
        .map(|column| {
            let mut tasks = by_column.remove(column.id.as_str()).unwrap_or_default();
            tasks.sort_by_key(|t| t.sort_order());
            ColumnGroup {
                column: column.clone(),
                tasks,
            }
        })
        .collect()
}

/// Coarse workflow stage of a column, used for card styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTone {
    Todo,
    InProgress,
    Done,
}

const DONE_KEYS: &[&str] = &["done", "selesai", "completed"];
const IN_PROGRESS_KEYS: &[&str] = &["in-progress", "progress", "doing", "dikerjakan"];

impl ColumnTone {
    pub fn of(column: &Column) -> Self {
        let id = column.id.to_lowercase();
        let name = column.name.to_lowercase();
        let matches = |keys: &[&str]| keys.iter().any(|k| id == *k || name.contains(k));
        if matches(DONE_KEYS) {
            ColumnTone::Done
        } else if matches(IN_PROGRESS_KEYS) {
            ColumnTone::InProgress
        } else {
            ColumnTone::Todo
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ColumnTone::Todo => "tone-todo",
            ColumnTone::InProgress => "tone-progress",
            ColumnTone::Done => "tone-done",
        }
    }
}
