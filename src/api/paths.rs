//! Endpoint Paths
//!
//! Ids are percent-encoded as single path segments.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

pub const BOARDS: &str = "/api/boards";
pub const LOGIN: &str = "/api/login";

fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

pub fn board(board_id: &str) -> String {
    format!("{}/{}", BOARDS, segment(board_id))
}

pub fn board_tasks(board_id: &str) -> String {
    format!("{}/tasks", board(board_id))
}

pub fn task(task_id: &str) -> String {
    format!("/api/tasks/{}", segment(task_id))
}

pub fn task_move(task_id: &str) -> String {
    format!("{}/move", task(task_id))
}

/// `?token=` suffix for the socket URL
pub fn token_query(token: &str) -> String {
    format!("?token={}", segment(token))
}
