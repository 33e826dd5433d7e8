//! Board API Interface
//!
//! Abstract transport for the remote board service. The app provides an
//! HTTP implementation; tests use an in-memory fake.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;
use crate::model::{Board, BoardPatch, Credentials, NewBoard, NewTask, Registration, Task, TaskPage, TaskQuery};
use crate::reorder::MoveIntent;

/// Registration endpoints, tried in order until one exists
pub const REGISTER_PATHS: [&str; 4] = ["/api/register", "/api/auth/register", "/register", "/auth/register"];

/// Remote board service
///
/// Every call fails with an `ApiError` on a non-2xx response. Futures are
/// not `Send`: the browser runs everything on one thread.
#[async_trait(?Send)]
pub trait BoardApi {
    /// Bearer token attached to subsequent requests
    fn set_token(&self, token: Option<String>);

    async fn list_boards(&self) -> ApiResult<Vec<Board>>;

    async fn get_board(&self, board_id: &str) -> ApiResult<Board>;

    async fn create_board(&self, board: &NewBoard) -> ApiResult<Board>;

    async fn update_board(&self, board_id: &str, patch: &BoardPatch) -> ApiResult<()>;

    async fn delete_board(&self, board_id: &str) -> ApiResult<()>;

    /// One page of a board's tasks
    async fn list_tasks(&self, board_id: &str, query: &TaskQuery) -> ApiResult<TaskPage>;

    async fn create_task(&self, board_id: &str, task: &NewTask) -> ApiResult<Task>;

    async fn update_task_title(&self, task_id: &str, title: &str) -> ApiResult<()>;

    async fn delete_task(&self, task_id: &str) -> ApiResult<()>;

    async fn move_task(&self, intent: &MoveIntent) -> ApiResult<()>;

    /// Raw login response; token extraction happens in the session layer
    async fn login(&self, credentials: &Credentials) -> ApiResult<Value>;

    /// Attempt registration at one endpoint path
    async fn register_at(&self, path: &str, registration: &Registration) -> ApiResult<()>;
}
