//! Rolling Logger
//!
//! `log` backend that keeps the most recent lines in a bounded ring buffer
//! and forwards each line to a sink (the browser console in the app).
//!
//! ```ignore
//! rolling_logger::init(LoggerConfig::default(), Box::new(MySink))?;
//! log::info!("ready");
//! let lines = rolling_logger::recent();
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Lines kept in memory when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("failed to install logger: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}

/// Destination for formatted lines
pub trait LogSink: Send + Sync {
    fn write(&self, level: Level, line: &str);
}

/// Sink that discards everything; the buffer still fills
pub struct NullSink;

impl LogSink for NullSink {
    fn write(&self, _level: Level, _line: &str) {}
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LevelFilter,
    pub capacity: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

pub struct RollingLogger {
    config: LoggerConfig,
    lines: Mutex<VecDeque<String>>,
    sink: Box<dyn LogSink>,
}

impl RollingLogger {
    pub fn new(config: LoggerConfig, sink: Box<dyn LogSink>) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            config: LoggerConfig { capacity, ..config },
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            sink,
        }
    }

    fn push(&self, line: String) {
        // a poisoned buffer only means a panic mid-push; keep logging
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        if lines.len() == self.config.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Buffered lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// `[2024-05-01 08:00:00.000 INFO target] message`
pub fn format_line(at: DateTime<Local>, level: Level, target: &str, message: &str) -> String {
    format!(
        "[{} {} {}] {}",
        at.format("%Y-%m-%d %H:%M:%S%.3f"),
        level,
        target,
        message
    )
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.config.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            Local::now(),
            record.level(),
            record.target(),
            &record.args().to_string(),
        );
        self.sink.write(record.level(), &line);
        self.push(line);
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

/// Install the global logger
pub fn init(config: LoggerConfig, sink: Box<dyn LogSink>) -> Result<&'static RollingLogger, LoggerError> {
    let level = config.level;
    if LOGGER.set(RollingLogger::new(config, sink)).is_err() {
        return Err(LoggerError::AlreadyInitialized);
    }
    let logger = LOGGER.get().ok_or(LoggerError::AlreadyInitialized)?;
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(logger)
}

/// Lines buffered by the global logger; empty before `init`
pub fn recent() -> Vec<String> {
    LOGGER.get().map(RollingLogger::recent).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CaptureSink(Arc<Mutex<Vec<(Level, String)>>>);

    impl LogSink for CaptureSink {
        fn write(&self, level: Level, line: &str) {
            self.0.lock().unwrap().push((level, line.to_string()));
        }
    }

    fn emit(logger: &RollingLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("board")
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_buffer_rolls_over() {
        let config = LoggerConfig {
            level: LevelFilter::Debug,
            capacity: 3,
        };
        let logger = RollingLogger::new(config, Box::new(NullSink));
        for i in 0..5 {
            emit(&logger, Level::Info, &format!("line {}", i));
        }
        let lines = logger.recent();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("line 2"));
        assert!(lines[2].ends_with("line 4"));

        logger.clear();
        assert!(logger.recent().is_empty());
    }

    #[test]
    fn test_level_filter_applies_to_sink_and_buffer() {
        let sink = CaptureSink::default();
        let logger = RollingLogger::new(LoggerConfig::default(), Box::new(sink.clone()));
        emit(&logger, Level::Debug, "hidden");
        emit(&logger, Level::Warn, "shown");

        let written = sink.0.lock().unwrap().clone();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, Level::Warn);
        assert_eq!(logger.recent().len(), 1);
    }

    #[test]
    fn test_line_format() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert_eq!(
            format_line(at, Level::Info, "board", "ready"),
            "[2024-05-01 08:00:00.000 INFO board] ready"
        );
    }

    #[test]
    fn test_zero_capacity_keeps_one_line() {
        let config = LoggerConfig {
            level: LevelFilter::Info,
            capacity: 0,
        };
        let logger = RollingLogger::new(config, Box::new(NullSink));
        emit(&logger, Level::Info, "a");
        emit(&logger, Level::Info, "b");
        assert_eq!(logger.recent().len(), 1);
    }
}
