//! Progress logging: batched percentage output and the task-aware logger
//! driving it from a task tree

mod batching;
mod error;
mod sink;
mod task_logger;

pub use batching::{BatchingProgressLogger, TASK_SEPARATOR};
pub use error::LoggerError;
pub use sink::{MemorySink, ProgressSink, TracingSink};
pub use task_logger::TaskProgressLogger;

/// Emits progress as throttled percentage lines plus free-form messages
///
/// Implementations keep a composed task path; `start_subtask` and
/// `finish_subtask` push and pop path segments.
pub trait ProgressLogger {
    fn log_progress(&mut self, progress: i64);

    /// Like [`log_progress`](Self::log_progress), but a flushed percentage
    /// is rendered through `template` with `{}` standing for the value
    fn log_progress_with_message(&mut self, progress: i64, template: &str);

    fn log_message(&self, message: &str);
    fn log_debug(&self, message: &str);
    fn log_warning(&self, message: &str);
    fn log_error(&self, message: &str);

    /// Emit 100% unless it was already reached
    fn log_finish_percentage(&mut self);

    /// Re-arm for a new volume; returns the unaccounted remainder of the
    /// previous one
    fn reset(&mut self, new_volume: i64) -> i64;

    fn start_subtask(&mut self, name: &str);
    fn finish_subtask(&mut self, name: &str) -> Result<(), LoggerError>;

    fn log_start(&self) {
        self.log_message("Start");
    }

    fn log_finish(&self) {
        self.log_message("Finished");
    }

    fn log_finish_with_failure(&self) {
        self.log_message("Failed");
    }
}
