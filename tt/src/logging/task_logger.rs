//! Task-aware progress logger
//!
//! Wraps a [`BatchingProgressLogger`] and derives its task path from a
//! task tree: every `log_begin_sub_task` renders a display name for the
//! entered task and pushes it onto the path, every end pops it again.
//! Children of iterative tasks are numbered by the iteration they belong
//! to, so repeated runs of the same subtask stay distinguishable in the
//! log.

use std::sync::Arc;

use super::ProgressLogger;
use super::batching::BatchingProgressLogger;
use super::error::LoggerError;
use super::sink::ProgressSink;
use crate::concurrency::Concurrency;
use crate::task::{IterationMode, Task};

pub struct TaskProgressLogger {
    inner: BatchingProgressLogger,
    base_task: Arc<Task>,
    /// Names pushed at begin time, popped at end time
    ///
    /// The name must be rendered when a task begins: by the time it ends,
    /// the parent's iteration counter has already advanced, so rendering
    /// again would produce a different name than the one on the path.
    current_names: Vec<String>,
}

impl TaskProgressLogger {
    pub fn new(sink: Arc<dyn ProgressSink>, base_task: &Arc<Task>, concurrency: Concurrency) -> Self {
        let inner = BatchingProgressLogger::new(
            sink,
            base_task.description(),
            base_task.progress().volume(),
            concurrency,
        );
        Self {
            inner,
            base_task: Arc::clone(base_task),
            current_names: Vec::new(),
        }
    }

    /// Display name for a task entering the path
    ///
    /// The base task contributes no extra segment; its description is the
    /// root of the path already. Children of iterative parents carry their
    /// iteration number, with the total only when it is bounded.
    fn subtask_name(&self, task: &Arc<Task>, parent: Option<&Arc<Task>>) -> String {
        if Arc::ptr_eq(task, &self.base_task) {
            return String::new();
        }
        if let Some(parent) = parent
            && let Some(mode) = parent.iteration_mode()
        {
            let iteration = parent.current_iteration().unwrap_or(0) + 1;
            return match mode {
                IterationMode::Open => format!("{} {iteration}", task.description()),
                IterationMode::Fixed | IterationMode::Dynamic => {
                    let max = parent.max_iterations().unwrap_or(0);
                    format!("{} {iteration} of {max}", task.description())
                }
            };
        }
        task.description().to_string()
    }

    pub fn log_begin_sub_task(&mut self, task: &Arc<Task>, parent: Option<&Arc<Task>>) {
        let name = self.subtask_name(task, parent);
        self.inner.start_subtask(&name);
        self.current_names.push(name);
        self.inner.reset(task.progress().volume());
        self.inner.log_start();
    }

    pub fn log_end_sub_task(&mut self, task: &Arc<Task>) -> Result<(), LoggerError> {
        self.finish_current(task, false)
    }

    pub fn log_end_sub_task_with_failure(&mut self, task: &Arc<Task>) -> Result<(), LoggerError> {
        self.finish_current(task, true)
    }

    fn finish_current(&mut self, task: &Arc<Task>, failed: bool) -> Result<(), LoggerError> {
        // Leaves close their percentage sequence either way
        if task.is_leaf() {
            self.inner.log_finish_percentage();
        }
        if failed {
            self.inner.log_finish_with_failure();
        } else {
            self.inner.log_finish();
        }
        let name = self.current_names.pop().unwrap_or_default();
        self.inner.finish_subtask(&name)
    }

    pub fn log_progress(&mut self, progress: i64) {
        self.inner.log_progress(progress);
    }

    pub fn log_progress_with_message(&mut self, progress: i64, template: &str) {
        self.inner.log_progress_with_message(progress, template);
    }

    pub fn reset(&mut self, new_volume: i64) -> i64 {
        self.inner.reset(new_volume)
    }

    pub fn log_message(&self, message: &str) {
        self.inner.log_message(message);
    }

    pub fn log_debug(&self, message: &str) {
        self.inner.log_debug(message);
    }

    pub fn log_warning(&self, message: &str) {
        self.inner.log_warning(message);
    }

    pub fn log_error(&self, message: &str) {
        self.inner.log_error(message);
    }

    /// Drop any path state left behind by an aborted run
    pub fn release(&mut self) {
        self.current_names.clear();
    }
}
