//! TaskRegistry - generic observable storage for in-flight tasks
//!
//! Tracks which tasks are currently running, keyed by `(username, job id)`.
//! The crate is generic over the stored task payload: consumers implement
//! (or get for free via `Arc`) the [`TaskHandle`] identity trait and plug
//! their own task type into the store, registry and service types.
//!
//! # Core Concepts
//!
//! - **One record per job**: a [`UserTask`] associates a username, a
//!   [`JobId`] and the task payload; the pair `(username, job_id)` is the
//!   storage key
//! - **Observable storage**: [`LocalTaskStore`] notifies registered
//!   [`TaskStoreListener`]s after every successful store/remove; a
//!   misbehaving listener cannot break storage or starve its peers
//! - **Session handles**: a [`TaskRegistry`] is the narrow handle an
//!   algorithm holds; [`LocalTaskRegistryFactory`] rejects duplicate jobs
//! - **Tracking off**: the `Empty*` family is behaviorally a no-op and
//!   indistinguishable from disabled tracking
//!
//! # Modules
//!
//! - [`job`] - job identity and the user/job/task association record
//! - [`store`] - the store contract plus local and empty implementations
//! - [`listener`] - observer interface for store mutations
//! - [`registry`] - session-facing registry handles and factories
//! - [`service`] - per-database holder of local stores
//! - [`memory`] - memory ranges and per-job memory accounting

pub mod job;
pub mod listener;
pub mod memory;
pub mod registry;
pub mod service;
pub mod store;

pub use job::{JobId, UserTask};
pub use listener::TaskStoreListener;
pub use memory::{MemoryRange, TaskMemoryContainer};
pub use registry::{
    EmptyTaskRegistryFactory, LocalTaskRegistryFactory, RegistryError, TaskHandle, TaskRegistry, TaskRegistryFactory,
};
pub use service::TaskStoreService;
pub use store::{EmptyTaskStore, LocalTaskStore, ObservableTaskStore, TaskStore};

/// Current wall-clock time as Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_recent() {
        let a = now_ms();
        let b = now_ms();
        assert!(a > 1_600_000_000_000); // after Sep 2020
        assert!(b >= a);
    }
}
