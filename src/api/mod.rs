//! HTTP Board API
//!
//! `BoardApi` over `reqwest` (browser fetch under wasm). JSON in and out,
//! bearer token on every request once signed in.

mod paths;

use std::cell::RefCell;

use async_trait::async_trait;
use board_core::{
    ApiError, ApiResult, Board, BoardApi, BoardPatch, ClientConfig, Credentials, MoveIntent, NewBoard, NewTask,
    Registration, Task, TaskPage, TaskQuery,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use paths::token_query;

#[derive(Serialize)]
struct TitleArgs<'a> {
    title: &'a str,
}

pub struct HttpApi {
    http: reqwest::Client,
    config: ClientConfig,
    token: RefCell<Option<String>>,
}

impl HttpApi {
    pub fn new(mut config: ClientConfig) -> Self {
        // fetch through reqwest needs absolute URLs; empty base means same origin
        if config.api_base_url.is_empty() {
            if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
                config.api_base_url = origin;
            }
        }
        Self {
            http: reqwest::Client::new(),
            config,
            token: RefCell::new(None),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.config.api_url(path));
        match self.token.borrow().as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::debug!("HTTP {} body: {}", status.as_u16(), body);
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = Self::send(builder).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send and ignore whatever body comes back
    async fn unit(builder: RequestBuilder) -> ApiResult<()> {
        Self::send(builder).await.map(|_| ())
    }
}

#[async_trait(?Send)]
impl BoardApi for HttpApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        Self::json(self.request(Method::GET, paths::BOARDS)).await
    }

    async fn get_board(&self, board_id: &str) -> ApiResult<Board> {
        Self::json(self.request(Method::GET, &paths::board(board_id))).await
    }

    async fn create_board(&self, board: &NewBoard) -> ApiResult<Board> {
        Self::json(self.request(Method::POST, paths::BOARDS).json(board)).await
    }

    async fn update_board(&self, board_id: &str, patch: &BoardPatch) -> ApiResult<()> {
        Self::unit(self.request(Method::PATCH, &paths::board(board_id)).json(patch)).await
    }

    async fn delete_board(&self, board_id: &str) -> ApiResult<()> {
        Self::unit(self.request(Method::DELETE, &paths::board(board_id))).await
    }

    async fn list_tasks(&self, board_id: &str, query: &TaskQuery) -> ApiResult<TaskPage> {
        let builder = self
            .request(Method::GET, &paths::board_tasks(board_id))
            .query(&query.to_pairs());
        Self::json(builder).await
    }

    async fn create_task(&self, board_id: &str, task: &NewTask) -> ApiResult<Task> {
        Self::json(self.request(Method::POST, &paths::board_tasks(board_id)).json(task)).await
    }

    async fn update_task_title(&self, task_id: &str, title: &str) -> ApiResult<()> {
        let body = TitleArgs { title };
        Self::unit(self.request(Method::PATCH, &paths::task(task_id)).json(&body)).await
    }

    async fn delete_task(&self, task_id: &str) -> ApiResult<()> {
        Self::unit(self.request(Method::DELETE, &paths::task(task_id))).await
    }

    async fn move_task(&self, intent: &MoveIntent) -> ApiResult<()> {
        Self::unit(self.request(Method::POST, &paths::task_move(&intent.task_id)).json(intent)).await
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<Value> {
        Self::json(self.request(Method::POST, paths::LOGIN).json(credentials)).await
    }

    async fn register_at(&self, path: &str, registration: &Registration) -> ApiResult<()> {
        Self::unit(self.request(Method::POST, path).json(registration)).await
    }
}
