//! Browser Console Logging
//!
//! Routes `log` records through the rolling logger into the web console.

use log::{Level, LevelFilter};
use rolling_logger::{LogSink, LoggerConfig};

struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, level: Level, line: &str) {
        let line = wasm_bindgen::JsValue::from_str(line);
        match level {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }
}

pub fn init(level: LevelFilter) {
    let config = LoggerConfig {
        level,
        ..LoggerConfig::default()
    };
    if let Err(e) = rolling_logger::init(config, Box::new(ConsoleSink)) {
        web_sys::console::warn_1(&format!("[LOG] {}", e).into());
    }
}
