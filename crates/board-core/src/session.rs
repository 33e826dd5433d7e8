//! Auth Session
//!
//! Bearer token and user id, stored as plain strings in the key-value store.
//! The token is written under both `token` and `authToken` so older builds
//! reading either key keep working.

use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::overlay::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_ID_KEY: &str = "userId";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }

    /// Build a session from a login response body
    pub fn from_login_response(body: &Value) -> ApiResult<Self> {
        let token = extract_token(body).ok_or(ApiError::MissingToken)?;
        Ok(Self {
            token,
            user_id: extract_user_id(body),
        })
    }

    /// Stored session, if any; `authToken` wins over `token`
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let token = [AUTH_TOKEN_KEY, TOKEN_KEY]
            .iter()
            .filter_map(|key| store.get(key))
            .find(|t| !t.is_empty())?;
        let user_id = store.get(USER_ID_KEY).filter(|u| !u.is_empty());
        Some(Self { token, user_id })
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        store.set(TOKEN_KEY, &self.token);
        store.set(AUTH_TOKEN_KEY, &self.token);
        match &self.user_id {
            Some(user_id) => store.set(USER_ID_KEY, user_id),
            None => store.remove(USER_ID_KEY),
        }
    }

    pub fn clear(store: &dyn KeyValueStore) {
        store.remove(TOKEN_KEY);
        store.remove(AUTH_TOKEN_KEY);
        store.remove(USER_ID_KEY);
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Token from any of the shapes login endpoints are known to return
pub fn extract_token(body: &Value) -> Option<String> {
    ["token", "accessToken", "access_token", "jwt"]
        .iter()
        .find_map(|key| non_empty_str(body.get(*key)))
        .or_else(|| non_empty_str(body.pointer("/data/token")))
}

/// User id as a string; numeric ids are accepted
pub fn extract_user_id(body: &Value) -> Option<String> {
    ["/userId", "/user/id", "/data/userId"]
        .iter()
        .filter_map(|path| body.pointer(path))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
