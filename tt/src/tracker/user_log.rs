//! Persistent warnings boundary
//!
//! Warnings logged through a tracker are additionally pushed into a
//! user-log registry keyed by the base task, so they outlive the scrolling
//! text log. Storage is somebody else's problem; this is just the seam.

/// Receives warning messages keyed by the task that produced them
pub trait UserLogStore: Send + Sync {
    fn add_warning(&self, task_description: &str, message: &str);
}

/// Discards all warnings; used when no user log is wired up
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyUserLogStore;

impl UserLogStore for EmptyUserLogStore {
    fn add_warning(&self, _task_description: &str, _message: &str) {}
}
