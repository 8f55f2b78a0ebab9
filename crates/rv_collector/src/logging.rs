use std::collections::VecDeque;
use std::sync::{Mutex, Once};

use tracing::Level;

static INIT: Once = Once::new();

/// Destination for collector log lines.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

/// Forwards to `tracing`, prepending any configured prefixes.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_new_prefixes(mut self, prefix: String) -> Self {
        self.prefixes.clear();
        self.prefixes.push_back(prefix);
        self
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefixes.push_back(prefix);
        self
    }

    fn prefixed(&self, message: &str) -> String {
        let prefix = self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>();
        format!("{}{}", prefix, message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.prefixed(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.prefixed(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", self.prefixed(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.prefixed(message));
    }
}

impl LogSink for Logger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => self.error(message),
            Level::WARN => self.warn(message),
            Level::INFO => self.info(message),
            _ => self.debug(message),
        }
    }
}

/// Keeps every line in memory, for tests and for callers that render logs themselves.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn at_level(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl LogSink for MemoryLog {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

pub fn init_logging(level: Level) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        });
    }
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        let logger = Logger::new()
            .with_prefix("[B000000001]".to_string())
            .with_prefix("[page 2]".to_string());
        assert_eq!(logger.prefixed("fetched"), "[B000000001] [page 2] fetched");

        let logger = logger.with_new_prefixes("[other]".to_string());
        assert_eq!(logger.prefixed("x"), "[other] x");
    }

    #[test]
    fn test_memory_log_filters_by_level() {
        let log = MemoryLog::new();
        log.log(Level::INFO, "start");
        log.log(Level::ERROR, "page 2 failed");
        log.log(Level::INFO, "done");

        assert_eq!(log.entries().len(), 3);
        assert_eq!(log.at_level(Level::ERROR), vec!["page 2 failed".to_string()]);
        assert_eq!(log.at_level(Level::WARN), Vec::<String>::new());
    }
}
