//! In-flight Move Guard
//!
//! Keeps at most one move request per task on the wire. Gestures made while
//! a move is pending are coalesced: only the newest one is replayed once the
//! pending request finishes.

use std::collections::HashMap;

use crate::reorder::MoveIntent;

/// Identifies one issued move request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveToken(u64);

/// What the caller should do with an admitted intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Send the request now
    Issue(MoveToken),
    /// Another move for this task is pending; the intent was queued
    Queued,
}

#[derive(Debug)]
struct PendingMove {
    token: MoveToken,
    queued: Option<MoveIntent>,
}

/// Per-task registry of pending move requests
#[derive(Debug, Default)]
pub struct InFlightMoves {
    pending: HashMap<String, PendingMove>,
    next_token: u64,
}

impl InFlightMoves {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> MoveToken {
        self.next_token += 1;
        MoveToken(self.next_token)
    }

    pub fn admit(&mut self, intent: MoveIntent) -> Admission {
        if let Some(pending) = self.pending.get_mut(&intent.task_id) {
            if pending.queued.is_some() {
                log::debug!("replacing queued move for task {}", intent.task_id);
            }
            pending.queued = Some(intent);
            return Admission::Queued;
        }
        let token = self.mint();
        self.pending.insert(
            intent.task_id.clone(),
            PendingMove {
                token,
                queued: None,
            },
        );
        Admission::Issue(token)
    }

    /// Finish a successful request
    ///
    /// Returns the queued follow-up (now in flight under a new token), if any.
    /// A stale token is ignored.
    pub fn complete(&mut self, task_id: &str, token: MoveToken) -> Option<(MoveIntent, MoveToken)> {
        match self.pending.get(task_id) {
            Some(p) if p.token == token => {}
            _ => return None,
        }
        let queued = self.pending.get_mut(task_id).and_then(|p| p.queued.take());
        match queued {
            Some(intent) => {
                let next = self.mint();
                if let Some(p) = self.pending.get_mut(task_id) {
                    p.token = next;
                }
                Some((intent, next))
            }
            None => {
                self.pending.remove(task_id);
                None
            }
        }
    }

    /// Finish a failed request, discarding any queued follow-up
    pub fn abort(&mut self, task_id: &str, token: MoveToken) {
        if self.pending.get(task_id).is_some_and(|p| p.token == token) {
            self.pending.remove(task_id);
        }
    }

    pub fn is_pending(&self, task_id: &str) -> bool {
        self.pending.contains_key(task_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(task: &str, column: &str, position: u32) -> MoveIntent {
        MoveIntent {
            task_id: task.into(),
            to_column_id: column.into(),
            to_position: position,
        }
    }

    fn issued(admission: Admission) -> MoveToken {
        match admission {
            Admission::Issue(token) => token,
            Admission::Queued => panic!("expected the move to be issued"),
        }
    }

    #[test]
    fn test_second_move_for_same_task_is_queued() {
        let mut guard = InFlightMoves::new();
        let token = issued(guard.admit(intent("t1", "doing", 1)));
        assert_eq!(guard.admit(intent("t1", "done", 1)), Admission::Queued);
        assert!(guard.is_pending("t1"));

        let (next, next_token) = guard.complete("t1", token).unwrap();
        assert_eq!(next.to_column_id, "done");
        assert_ne!(next_token, token);
        assert!(guard.complete("t1", next_token).is_none());
        assert!(!guard.is_pending("t1"));
    }

    #[test]
    fn test_only_newest_queued_intent_survives() {
        let mut guard = InFlightMoves::new();
        let token = issued(guard.admit(intent("t1", "doing", 1)));
        guard.admit(intent("t1", "done", 1));
        guard.admit(intent("t1", "todo", 3));
        let (next, _) = guard.complete("t1", token).unwrap();
        assert_eq!(next, intent("t1", "todo", 3));
    }

    #[test]
    fn test_different_tasks_do_not_block_each_other() {
        let mut guard = InFlightMoves::new();
        issued(guard.admit(intent("t1", "doing", 1)));
        issued(guard.admit(intent("t2", "doing", 2)));
        assert_eq!(guard.pending_count(), 2);
    }

    #[test]
    fn test_abort_drops_queue() {
        let mut guard = InFlightMoves::new();
        let token = issued(guard.admit(intent("t1", "doing", 1)));
        guard.admit(intent("t1", "done", 1));
        guard.abort("t1", token);
        assert!(!guard.is_pending("t1"));
        issued(guard.admit(intent("t1", "done", 1)));
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut guard = InFlightMoves::new();
        let token = issued(guard.admit(intent("t1", "doing", 1)));
        guard.admit(intent("t1", "done", 1));
        let (_, fresh) = guard.complete("t1", token).unwrap();

        guard.abort("t1", token);
        assert!(guard.is_pending("t1"));
        assert!(guard.complete("t1", token).is_none());
        assert!(guard.is_pending("t1"));
        assert!(guard.complete("t1", fresh).is_none());
        assert!(!guard.is_pending("t1"));
    }
}
