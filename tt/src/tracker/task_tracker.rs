//! Tracker driving a task tree, a registry and a logger in lockstep
//!
//! Nested `begin_sub_task`/`end_sub_task` calls follow a stack
//! discipline: beginning pushes the current task and descends via
//! `next_subtask`, ending pops. The first begin registers the base task
//! with the registry so observers can see the computation; the last end
//! unregisters it again.

use std::sync::Arc;

use taskregistry::{MemoryRange, TaskRegistry};

use super::error::TrackerError;
use super::progress_tracker::{EndTask, ErrorPolicy, ProgressTracker, SubTask};
use super::user_log::{EmptyUserLogStore, UserLogStore};
use crate::concurrency::Concurrency;
use crate::logging::{ProgressSink, TaskProgressLogger, TracingSink};
use crate::task::{Status, Task, UNKNOWN_VOLUME};

struct StepTracker {
    total_steps: i64,
    leftover: f64,
}

pub struct TaskProgressTracker {
    base_task: Arc<Task>,
    registry: TaskRegistry<Arc<Task>>,
    logger: TaskProgressLogger,
    user_log: Arc<dyn UserLogStore>,
    concurrency: Concurrency,
    error_policy: ErrorPolicy,
    misuse_reported: bool,
    current: Option<Arc<Task>>,
    nested: Vec<Arc<Task>>,
    steps: Option<StepTracker>,
}

impl TaskProgressTracker {
    pub fn new(base_task: Arc<Task>, registry: TaskRegistry<Arc<Task>>, concurrency: Concurrency) -> Self {
        Self::with_sink(base_task, registry, concurrency, Arc::new(TracingSink))
    }

    pub fn with_sink(
        base_task: Arc<Task>,
        registry: TaskRegistry<Arc<Task>>,
        concurrency: Concurrency,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        base_task.set_max_concurrency(concurrency);
        let logger = TaskProgressLogger::new(sink, &base_task, concurrency);
        Self {
            base_task,
            registry,
            logger,
            user_log: Arc::new(EmptyUserLogStore),
            concurrency,
            error_policy: ErrorPolicy::default(),
            misuse_reported: false,
            current: None,
            nested: Vec::new(),
            steps: None,
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_user_log(mut self, user_log: Arc<dyn UserLogStore>) -> Self {
        self.user_log = user_log;
        self
    }

    pub fn base_task(&self) -> &Arc<Task> {
        &self.base_task
    }

    /// Apply the configured policy to a misuse error
    fn report(&mut self, error: TrackerError) -> Result<(), TrackerError> {
        match self.error_policy {
            ErrorPolicy::Raise => Err(error),
            ErrorPolicy::WarnOnce => {
                if !self.misuse_reported {
                    self.misuse_reported = true;
                    self.logger.log_warning(&format!("progress tracker misuse: {error}"));
                }
                Ok(())
            }
        }
    }

    fn register_base_task(&self) {
        if !self.registry.contains_task(&self.base_task) {
            self.registry.register_task(Arc::clone(&self.base_task));
        }
    }

    fn teardown(&mut self) {
        self.registry.unregister_task();
        self.logger.release();
        self.nested.clear();
        self.steps = None;
    }
}

impl ProgressTracker for TaskProgressTracker {
    fn begin_sub_task(&mut self, options: SubTask) -> Result<(), TrackerError> {
        self.register_base_task();
        let next = match self.current.take() {
            None => Arc::clone(&self.base_task),
            Some(parent) => {
                let next = parent.next_subtask();
                self.nested.push(parent);
                match next {
                    Ok(task) => task,
                    Err(err) => {
                        self.report(err.into())?;
                        Task::empty()
                    }
                }
            }
        };
        if let Some(expected) = options.name()
            && next.description() != expected
        {
            self.report(TrackerError::SubtaskNameMismatch {
                expected: expected.to_string(),
                actual: next.description().to_string(),
            })?;
        }
        if let Err(err) = next.start() {
            self.report(err.into())?;
        }
        if let Some(volume) = options.volume()
            && let Err(err) = next.set_volume(volume)
        {
            self.report(err.into())?;
        }
        let parent = self.nested.last().cloned();
        self.logger.log_begin_sub_task(&next, parent.as_ref());
        self.current = Some(next);
        self.steps = None;
        Ok(())
    }

    fn end_sub_task(&mut self, options: EndTask) -> Result<(), TrackerError> {
        let Some(current) = self.current.take() else {
            return self.report(TrackerError::NoActiveTask);
        };
        if let Some(expected) = options.name()
            && current.description() != expected
        {
            let err = TrackerError::SubtaskNameMismatch {
                expected: expected.to_string(),
                actual: current.description().to_string(),
            };
            if self.error_policy == ErrorPolicy::Raise {
                self.current = Some(current);
                return Err(err);
            }
            self.report(err)?;
        }
        if let Err(err) = current.finish() {
            self.report(err.into())?;
        }
        if let Err(err) = self.logger.log_end_sub_task(&current) {
            self.report(err.into())?;
        }
        self.current = self.nested.pop();
        self.steps = None;
        if self.current.is_none() {
            self.teardown();
        }
        Ok(())
    }

    fn end_sub_task_with_failure(&mut self, options: EndTask) -> Result<(), TrackerError> {
        let Some(current) = self.current.take() else {
            return self.report(TrackerError::NoActiveTask);
        };
        if let Some(expected) = options.name()
            && current.description() != expected
        {
            let err = TrackerError::SubtaskNameMismatch {
                expected: expected.to_string(),
                actual: current.description().to_string(),
            };
            if self.error_policy == ErrorPolicy::Raise {
                self.current = Some(current);
                return Err(err);
            }
            self.report(err)?;
        }
        current.fail();
        if let Err(err) = self.logger.log_end_sub_task_with_failure(&current) {
            self.report(err.into())?;
        }
        self.current = self.nested.pop();
        if self.current.is_some() {
            // Failure cascades through every ancestor on the stack
            self.end_sub_task_with_failure(EndTask::current())
        } else {
            self.teardown();
            Ok(())
        }
    }

    fn log_progress(&mut self, value: i64) -> Result<(), TrackerError> {
        let Some(current) = self.current.clone() else {
            return self.report(TrackerError::NoActiveTask);
        };
        if let Err(err) = current.log_progress(value) {
            return self.report(err.into());
        }
        self.logger.log_progress(value);
        Ok(())
    }

    fn log_progress_with_message(&mut self, value: i64, template: &str) -> Result<(), TrackerError> {
        let Some(current) = self.current.clone() else {
            return self.report(TrackerError::NoActiveTask);
        };
        if let Err(err) = current.log_progress(value) {
            return self.report(err.into());
        }
        self.logger.log_progress_with_message(value, template);
        Ok(())
    }

    fn set_volume(&mut self, volume: i64) -> Result<(), TrackerError> {
        let Some(current) = self.current.clone() else {
            return self.report(TrackerError::NoActiveTask);
        };
        if let Err(err) = current.set_volume(volume) {
            return self.report(err.into());
        }
        self.logger.reset(volume);
        Ok(())
    }

    fn current_volume(&mut self) -> Result<i64, TrackerError> {
        match self.current.clone() {
            Some(current) => Ok(current.progress().volume()),
            None => {
                self.report(TrackerError::NoActiveTask)?;
                Ok(UNKNOWN_VOLUME)
            }
        }
    }

    fn set_steps(&mut self, steps: i64) -> Result<(), TrackerError> {
        if steps < 1 {
            return self.report(TrackerError::InvalidSteps { steps });
        }
        self.steps = Some(StepTracker {
            total_steps: steps,
            leftover: 0.0,
        });
        Ok(())
    }

    /// Convert completed steps into a progress delta
    ///
    /// `delta = floor(steps * volume / total_steps + leftover)`; the
    /// fractional remainder carries over so the deltas sum to the volume.
    fn log_steps(&mut self, steps: i64) -> Result<(), TrackerError> {
        let (total_steps, leftover) = match &self.steps {
            Some(state) => (state.total_steps, state.leftover),
            None => return self.report(TrackerError::StepsNotConfigured),
        };
        let volume = match self.current.clone() {
            Some(current) => current.progress().volume(),
            None => return self.report(TrackerError::NoActiveTask),
        };
        let raw = steps as f64 * volume as f64 / total_steps as f64 + leftover;
        let delta = raw.floor();
        if let Some(state) = &mut self.steps {
            state.leftover = raw - delta;
        }
        self.log_progress(delta as i64)
    }

    fn log_debug(&self, message: &str) {
        self.logger.log_debug(message);
    }

    fn log_info(&self, message: &str) {
        self.logger.log_message(message);
    }

    /// Warnings also go to the user log, keyed by the base task
    fn log_warning(&self, message: &str) {
        self.logger.log_warning(message);
        self.user_log.add_warning(self.base_task.description(), message);
    }

    fn set_estimated_resource_footprint(&self, memory: MemoryRange) {
        self.base_task.set_estimated_memory_range(memory);
    }

    fn requested_concurrency(&self) -> Concurrency {
        self.concurrency
    }

    fn release(&mut self) {
        if self.base_task.status() == Status::Running {
            self.logger
                .log_warning("progress tracker released while the base task is still running");
            debug_assert!(
                self.base_task.status() != Status::Running,
                "base task '{}' is still running at release",
                self.base_task.description()
            );
        }
        self.current = None;
        self.teardown();
    }
}
