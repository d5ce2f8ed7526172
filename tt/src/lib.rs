//! TaskTrack - hierarchical progress tracking for long-running
//! computations
//!
//! A computation declares its work as a tree of [`task::Task`] nodes,
//! drives them through a small state machine, and reports fine-grained
//! progress that is throttled into roughly one hundred percentage lines
//! per task. The live task tree is published through the `taskregistry`
//! crate so monitoring and administrative callers can observe every
//! running computation.
//!
//! # Core Concepts
//!
//! - **Task tree**: leaf tasks own an atomic progress counter,
//!   intermediate tasks aggregate their children, iterative tasks repeat
//!   a batch of subtasks per iteration
//! - **Throttled logging**: [`logging::BatchingProgressLogger`] flushes
//!   progress in power-of-two batches and emits each percentage at most
//!   once, strictly increasing
//! - **Tracker facade**: algorithm code holds a
//!   [`tracker::ProgressTracker`] and brackets its phases with
//!   `begin_sub_task`/`end_sub_task`; the tracker keeps tree, registry
//!   and logger in lockstep
//! - **Observability**: the base task is registered under
//!   `(username, job id)` for the duration of the run
//!
//! # Modules
//!
//! - [`task`] - the task tree, lifecycle states, progress values,
//!   traversal and rendering
//! - [`logging`] - batched percentage output and task-aware naming
//! - [`tracker`] - the facade, its error policy and the user-log seam
//! - [`concurrency`] - validated worker-count configuration

pub mod concurrency;
pub mod logging;
pub mod task;
pub mod tracker;

pub use concurrency::Concurrency;
pub use task::{IterationMode, Progress, Status, Task, TaskError, UNKNOWN_VOLUME};
pub use tracker::{
    EndTask, ErrorPolicy, NullProgressTracker, ProgressTracker, SubTask, TaskProgressTracker, TrackerError,
};
