//! Build-time Configuration
//!
//! Reads `AMBIS_*` variables captured when the bundle is compiled.

use board_core::config::{
    ENV_API_URL, ENV_ENABLE_SOCKET, ENV_LOG_LEVEL, ENV_SOCKET_PATH, ENV_SOCKET_URL, ENV_TASK_PAGE_LIMIT,
};
use board_core::ClientConfig;

fn build_env(name: &str) -> Option<&'static str> {
    match name {
        ENV_API_URL => option_env!("AMBIS_API_URL"),
        ENV_SOCKET_URL => option_env!("AMBIS_SOCKET_URL"),
        ENV_SOCKET_PATH => option_env!("AMBIS_SOCKET_PATH"),
        ENV_ENABLE_SOCKET => option_env!("AMBIS_ENABLE_SOCKET"),
        ENV_TASK_PAGE_LIMIT => option_env!("AMBIS_TASK_PAGE_LIMIT"),
        ENV_LOG_LEVEL => option_env!("AMBIS_LOG_LEVEL"),
        _ => None,
    }
}

pub fn load() -> ClientConfig {
    ClientConfig::from_lookup(|name| build_env(name).map(str::to_string))
}
