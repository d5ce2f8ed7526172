//! The tracker facade algorithms program against

use taskregistry::MemoryRange;

use super::error::TrackerError;
use crate::concurrency::Concurrency;
use crate::task::UNKNOWN_VOLUME;

/// Options for entering a subtask
///
/// Name and volume are independently optional; `SubTask::next()` just
/// descends into whatever subtask comes next.
#[derive(Debug, Clone, Default)]
pub struct SubTask {
    name: Option<String>,
    volume: Option<i64>,
}

impl SubTask {
    /// Descend into the next subtask, whatever its name
    pub fn next() -> Self {
        Self::default()
    }

    /// Descend into the next subtask and assert its name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            volume: None,
        }
    }

    /// Set the subtask's volume on entry
    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn volume(&self) -> Option<i64> {
        self.volume
    }
}

/// Options for ending a subtask
#[derive(Debug, Clone, Default)]
pub struct EndTask {
    name: Option<String>,
}

impl EndTask {
    /// End the current subtask, whatever its name
    pub fn current() -> Self {
        Self::default()
    }

    /// End the current subtask and assert its name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// How a tracker reacts to protocol misuse
///
/// `Raise` surfaces the error to the caller immediately. `WarnOnce` keeps
/// the computation alive: the first misuse per tracker is logged as a
/// warning, everything after that is silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Raise,
    WarnOnce,
}

/// Progress reporting facade handed to algorithm code
///
/// Calls on one tracker handle must be serialized by the caller; only the
/// leaf progress counter underneath tolerates concurrent increments.
pub trait ProgressTracker {
    fn begin_sub_task(&mut self, options: SubTask) -> Result<(), TrackerError>;
    fn end_sub_task(&mut self, options: EndTask) -> Result<(), TrackerError>;

    /// Fail the current subtask and every ancestor on the stack
    fn end_sub_task_with_failure(&mut self, options: EndTask) -> Result<(), TrackerError>;

    fn log_progress(&mut self, value: i64) -> Result<(), TrackerError>;
    fn log_progress_with_message(&mut self, value: i64, template: &str) -> Result<(), TrackerError>;

    fn set_volume(&mut self, volume: i64) -> Result<(), TrackerError>;
    fn current_volume(&mut self) -> Result<i64, TrackerError>;

    /// Declare how many logical steps the current subtask has
    fn set_steps(&mut self, steps: i64) -> Result<(), TrackerError>;

    /// Report `steps` completed steps as a progress delta
    fn log_steps(&mut self, steps: i64) -> Result<(), TrackerError>;

    fn log_debug(&self, message: &str);
    fn log_info(&self, message: &str);
    fn log_warning(&self, message: &str);

    fn set_estimated_resource_footprint(&self, memory: MemoryRange);
    fn requested_concurrency(&self) -> Concurrency;

    /// Tear down tracking for this computation
    fn release(&mut self);
}

/// Tracker that tracks nothing; the "tracking off" variant
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressTracker;

impl ProgressTracker for NullProgressTracker {
    fn begin_sub_task(&mut self, _options: SubTask) -> Result<(), TrackerError> {
        Ok(())
    }

    fn end_sub_task(&mut self, _options: EndTask) -> Result<(), TrackerError> {
        Ok(())
    }

    fn end_sub_task_with_failure(&mut self, _options: EndTask) -> Result<(), TrackerError> {
        Ok(())
    }

    fn log_progress(&mut self, _value: i64) -> Result<(), TrackerError> {
        Ok(())
    }

    fn log_progress_with_message(&mut self, _value: i64, _template: &str) -> Result<(), TrackerError> {
        Ok(())
    }

    fn set_volume(&mut self, _volume: i64) -> Result<(), TrackerError> {
        Ok(())
    }

    fn current_volume(&mut self) -> Result<i64, TrackerError> {
        Ok(UNKNOWN_VOLUME)
    }

    fn set_steps(&mut self, _steps: i64) -> Result<(), TrackerError> {
        Ok(())
    }

    fn log_steps(&mut self, _steps: i64) -> Result<(), TrackerError> {
        Ok(())
    }

    fn log_debug(&self, _message: &str) {}
    fn log_info(&self, _message: &str) {}
    fn log_warning(&self, _message: &str) {}

    fn set_estimated_resource_footprint(&self, _memory: MemoryRange) {}

    fn requested_concurrency(&self) -> Concurrency {
        Concurrency::single()
    }

    fn release(&mut self) {}
}
