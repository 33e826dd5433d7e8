//! Client Configuration
//!
//! Values are resolved once at start-up from a name lookup (build-time env
//! in the app, a map in tests). Unparseable values fall back to defaults.

use std::str::FromStr;

use log::LevelFilter;

use crate::model::MAX_PAGE_LIMIT;

pub const ENV_API_URL: &str = "AMBIS_API_URL";
pub const ENV_SOCKET_URL: &str = "AMBIS_SOCKET_URL";
pub const ENV_SOCKET_PATH: &str = "AMBIS_SOCKET_PATH";
pub const ENV_ENABLE_SOCKET: &str = "AMBIS_ENABLE_SOCKET";
pub const ENV_TASK_PAGE_LIMIT: &str = "AMBIS_TASK_PAGE_LIMIT";
pub const ENV_LOG_LEVEL: &str = "AMBIS_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Prefix for REST calls; empty means same origin
    pub api_base_url: String,
    pub socket_url: String,
    pub socket_path: String,
    pub enable_socket: bool,
    pub task_page_limit: u32,
    pub log_level: LevelFilter,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            socket_url: "http://localhost:8080".to_string(),
            socket_path: "/socket.io/".to_string(),
            enable_socket: false,
            task_page_limit: MAX_PAGE_LIMIT,
            log_level: LevelFilter::Info,
        }
    }
}

impl ClientConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_base_url: get(ENV_API_URL)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            socket_url: get(ENV_SOCKET_URL)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.socket_url),
            socket_path: get(ENV_SOCKET_PATH).unwrap_or(defaults.socket_path),
            enable_socket: get(ENV_ENABLE_SOCKET)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.enable_socket),
            task_page_limit: get(ENV_TASK_PAGE_LIMIT)
                .and_then(|v| v.parse::<u32>().ok())
                .map(|n| n.clamp(1, MAX_PAGE_LIMIT))
                .unwrap_or(defaults.task_page_limit),
            log_level: get(ENV_LOG_LEVEL)
                .and_then(|v| LevelFilter::from_str(&v).ok())
                .unwrap_or(defaults.log_level),
        }
    }

    /// Absolute URL for an API path such as `/api/boards`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// WebSocket endpoint derived from `socket_url` and `socket_path`
    pub fn socket_endpoint(&self) -> String {
        let base = if let Some(rest) = self.socket_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.socket_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.socket_url.clone()
        };
        let path = if self.socket_path.starts_with('/') {
            self.socket_path.clone()
        } else {
            format!("/{}", self.socket_path)
        };
        format!("{}{}", base, path)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
