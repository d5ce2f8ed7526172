//! Task state machine error types

use thiserror::Error;

use super::status::Status;

/// Protocol violations raised by the task tree
///
/// All of these indicate a bug in the driving algorithm (mismatched
/// begin/end calls, advancing while a child runs, ...) and are surfaced
/// immediately rather than retried.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task '{description}' cannot transition from {from} to {to}")]
    InvalidTransition {
        description: String,
        from: Status,
        to: Status,
    },

    #[error("task '{description}' must be running to advance, but is {status}")]
    NotRunning { description: String, status: Status },

    #[error("cannot advance task '{description}' while subtask '{subtask}' is still running")]
    SubtaskStillRunning { description: String, subtask: String },

    #[error("task '{description}' has no more pending subtasks")]
    NoPendingSubtasks { description: String },

    #[error("{operation} is only supported on leaf tasks, but '{description}' has subtasks")]
    NotALeaf {
        description: String,
        operation: &'static str,
    },

    #[error("task '{description}' is not an iterative task")]
    NotIterative { description: String },

    #[error("iterations can only be added to open iterative tasks, but '{description}' is {mode}")]
    IterationsExhausted {
        description: String,
        mode: super::node::IterationMode,
    },

    #[error("cannot add an iteration to '{description}' after it finished")]
    IterationAfterFinish { description: String },
}
