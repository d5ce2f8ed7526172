//! Text output boundary
//!
//! The loggers decide *when* a line should be emitted; the sink decides
//! where it goes. The default sink forwards to `tracing`; tests use
//! [`MemorySink`] to capture lines for assertions.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

/// Leveled text sink the progress loggers write through
pub trait ProgressSink: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink forwarding each line to the `tracing` macros
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn debug(&self, message: &str) {
        debug!(target: "progress", "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: "progress", "{message}");
    }

    fn warn(&self, message: &str) {
        warn!(target: "progress", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "progress", "{message}");
    }
}

/// Captures emitted lines; intended for tests
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(&'static str, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: &'static str, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }

    /// All captured messages, any level, in emission order
    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    /// Captured messages at one level
    pub fn messages_at(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl ProgressSink for MemorySink {
    fn debug(&self, message: &str) {
        self.push("debug", message);
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.info("one");
        sink.warn("two");
        sink.info("three");

        assert_eq!(sink.messages(), vec!["one", "two", "three"]);
        assert_eq!(sink.messages_at("warn"), vec!["two"]);
        assert_eq!(sink.messages_at("info"), vec!["one", "three"]);
    }
}
