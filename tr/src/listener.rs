//! Observer interface for task store mutations
//!
//! Listeners are invoked synchronously after a mutation has been applied.
//! Implementations must tolerate being called from any thread; panics are
//! caught by the store and logged, never propagated.

use crate::job::{JobId, UserTask};

/// Callback interface for consumers (UIs, telemetry) observing a store
pub trait TaskStoreListener<T>: Send + Sync {
    /// A task was stored under `(username, job_id)`
    fn on_task_added(&self, user_task: &UserTask<T>);

    /// The task stored under `(username, job_id)` was removed
    fn on_task_removed(&self, username: &str, job_id: &JobId);

    /// The store was cleared as a whole (e.g. database dropped)
    fn on_store_cleared(&self);
}
