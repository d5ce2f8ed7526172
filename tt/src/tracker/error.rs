//! Tracker error types

use thiserror::Error;

use crate::logging::LoggerError;
use crate::task::TaskError;

/// Misuse of the tracker facade, or an error bubbling up from the task
/// tree or logger underneath it
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Logger(#[from] LoggerError),

    #[error("no active task, begin_sub_task must be called first")]
    NoActiveTask,

    #[error("expected subtask '{expected}' but the current subtask is '{actual}'")]
    SubtaskNameMismatch { expected: String, actual: String },

    #[error("step count must be at least 1, got {steps}")]
    InvalidSteps { steps: i64 },

    #[error("set_steps must be called before log_steps")]
    StepsNotConfigured,
}
