//! Progress logger error types

use thiserror::Error;

/// Raised when begin/end subtask calls are mismatched
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown subtask '{name}', current task path is '{path}'")]
    UnknownSubtask { name: String, path: String },
}
