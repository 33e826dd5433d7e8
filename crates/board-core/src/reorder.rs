//! Drag Reorder Engine
//!
//! Turns a finished drag gesture into at most one move request.
//! Drop indexes are 0-based; the API wants a 1-based position.

use std::sync::Arc;

use serde::Serialize;

/// Where a card was picked up or dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragLocation {
    pub column_id: String,
    pub index: usize,
}

impl DragLocation {
    pub fn new(column_id: impl Into<String>, index: usize) -> Self {
        Self {
            column_id: column_id.into(),
            index,
        }
    }
}

/// A completed drag gesture
///
/// `destination` is `None` when the card was released outside any column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResult {
    pub dragged_id: String,
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
}

impl DragResult {
    /// True when the gesture should not produce any request
    pub fn is_noop(&self) -> bool {
        match &self.destination {
            None => true,
            Some(dest) => dest.column_id == self.source.column_id && dest.index == self.source.index,
        }
    }
}

/// Normalized move instruction sent to `POST /api/tasks/{id}/move`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIntent {
    #[serde(skip_serializing)]
    pub task_id: String,
    pub to_column_id: String,
    /// 1-based
    pub to_position: u32,
}

/// Resolve a drag gesture into a move intent
///
/// Cancelled drops, drops back onto the starting slot and slots beyond
/// the wire range yield `None`.
pub fn resolve_drop(result: &DragResult) -> Option<MoveIntent> {
    if result.is_noop() {
        return None;
    }
    let dest = result.destination.as_ref()?;
    let to_position = u32::try_from(dest.index).ok()?.checked_add(1)?;
    Some(MoveIntent {
        task_id: result.dragged_id.clone(),
        to_column_id: dest.column_id.clone(),
        to_position,
    })
}

// ========================
// Local-state Variant
// ========================

/// A card held in local board state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCard {
    pub id: String,
    pub content: String,
}

/// A column of cards held in local board state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalColumn {
    pub id: String,
    pub title: String,
    pub cards: Vec<LocalCard>,
}

/// Splice a card between columns without a server round-trip
///
/// Untouched columns are returned as the same `Arc`, touched ones as new
/// `Arc`s, so callers can skip re-rendering by pointer comparison.
/// Returns `None` when nothing should change.
pub fn apply_local_move(
    columns: &[Arc<LocalColumn>],
    result: &DragResult,
) -> Option<Vec<Arc<LocalColumn>>> {
    if result.is_noop() {
        return None;
    }
    let dest = result.destination.as_ref()?;
    let src_pos = columns.iter().position(|c| c.id == result.source.column_id)?;
    let dest_pos = columns.iter().position(|c| c.id == dest.column_id)?;

    let mut src_cards = columns[src_pos].cards.clone();
    if result.source.index >= src_cards.len() {
        return None;
    }
    let card = src_cards.remove(result.source.index);

    let mut next: Vec<Arc<LocalColumn>> = columns.to_vec();
    if src_pos == dest_pos {
        let at = dest.index.min(src_cards.len());
        src_cards.insert(at, card);
        next[src_pos] = Arc::new(LocalColumn {
            cards: src_cards,
            ..(*columns[src_pos]).clone()
        });
    } else {
        let mut dest_cards = columns[dest_pos].cards.clone();
        let at = dest.index.min(dest_cards.len());
        dest_cards.insert(at, card);
        next[src_pos] = Arc::new(LocalColumn {
            cards: src_cards,
            ..(*columns[src_pos]).clone()
        });
        next[dest_pos] = Arc::new(LocalColumn {
            cards: dest_cards,
            ..(*columns[dest_pos]).clone()
        });
    }
    Some(next)
}
