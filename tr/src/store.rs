//! Task store contract plus the local and empty implementations
//!
//! [`ObservableTaskStore`] is the reusable fan-out base: a concrete store
//! performs its mutation inside a hook closure, and listeners are notified
//! only when the hook reports success. [`LocalTaskStore`] layers an
//! in-memory map behind that base; [`EmptyTaskStore`] is the no-op variant
//! handed out when tracking is disabled.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::job::{JobId, UserTask};
use crate::listener::TaskStoreListener;

/// Keyed collection of [`UserTask`], observable via listeners
///
/// Implementations must support concurrent `store`/`remove`/`query` from
/// unrelated sessions. No method blocks on I/O; everything returns
/// immediately.
pub trait TaskStore<T>: Send + Sync {
    /// Store a task under `(username, job_id)`, replacing any previous entry
    fn store(&self, username: &str, job_id: JobId, task: T);

    /// Remove the task stored under `(username, job_id)`, if any
    fn remove(&self, username: &str, job_id: &JobId);

    /// All stored tasks
    fn query_all(&self) -> Vec<UserTask<T>>;

    /// All tasks for a job, across users
    fn query_job(&self, job_id: &JobId) -> Vec<UserTask<T>>;

    /// All tasks for a user, across jobs
    fn query_user(&self, username: &str) -> Vec<UserTask<T>>;

    /// The single task under `(username, job_id)`, or `None`
    fn query(&self, username: &str, job_id: &JobId) -> Option<UserTask<T>>;

    /// Whether the store holds no tasks
    fn is_empty(&self) -> bool;

    /// Number of stored tasks
    fn task_count(&self) -> usize;

    /// Register a listener for subsequent mutations
    fn add_listener(&self, listener: Arc<dyn TaskStoreListener<T>>);
}

/// Reusable listener fan-out base for store implementations
///
/// Notification happens only when the mutation hook reports success, so
/// observers never see phantom events. Each listener is called inside
/// `catch_unwind`: a panicking listener is logged and skipped, storage
/// correctness and the remaining listeners are unaffected.
pub struct ObservableTaskStore<T> {
    listeners: RwLock<Vec<Arc<dyn TaskStoreListener<T>>>>,
}

impl<T: Clone> ObservableTaskStore<T> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener
    pub fn add_listener(&self, listener: Arc<dyn TaskStoreListener<T>>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Run the store hook; on success fan out `on_task_added`
    pub fn store_with_notification<F>(&self, hook: F) -> Option<UserTask<T>>
    where
        F: FnOnce() -> Option<UserTask<T>>,
    {
        let stored = hook()?;
        self.notify_each(|listener| listener.on_task_added(&stored));
        Some(stored)
    }

    /// Run the remove hook; if it reports success fan out `on_task_removed`
    pub fn remove_with_notification<F>(&self, username: &str, job_id: &JobId, hook: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let removed = hook();
        if removed {
            self.notify_each(|listener| listener.on_task_removed(username, job_id));
        }
        removed
    }

    /// Run the clear hook, then fan out `on_store_cleared`
    pub fn clear_with_notification<F>(&self, hook: F)
    where
        F: FnOnce(),
    {
        hook();
        self.notify_each(|listener| listener.on_store_cleared());
    }

    fn notify_each(&self, notify: impl Fn(&dyn TaskStoreListener<T>)) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| notify(listener.as_ref()))).is_err() {
                warn!("task store listener panicked during notification; skipping it");
            }
        }
    }
}

impl<T: Clone> Default for ObservableTaskStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory observable task store, one per logical database
pub struct LocalTaskStore<T> {
    tasks: RwLock<HashMap<(String, JobId), UserTask<T>>>,
    observable: ObservableTaskStore<T>,
}

impl<T: Clone + Send + Sync> LocalTaskStore<T> {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            observable: ObservableTaskStore::new(),
        }
    }

    /// Drop every entry and tell listeners the store was cleared
    pub fn clear(&self) {
        self.observable.clear_with_notification(|| {
            self.tasks.write().unwrap_or_else(PoisonError::into_inner).clear();
        });
    }
}

impl<T: Clone + Send + Sync> Default for LocalTaskStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> TaskStore<T> for LocalTaskStore<T> {
    fn store(&self, username: &str, job_id: JobId, task: T) {
        self.observable.store_with_notification(|| {
            let user_task = UserTask::new(username, job_id.clone(), task);
            self.tasks
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((username.to_string(), job_id), user_task.clone());
            Some(user_task)
        });
    }

    fn remove(&self, username: &str, job_id: &JobId) {
        self.observable.remove_with_notification(username, job_id, || {
            self.tasks
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&(username.to_string(), job_id.clone()))
                .is_some()
        });
    }

    fn query_all(&self) -> Vec<UserTask<T>> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn query_job(&self, job_id: &JobId) -> Vec<UserTask<T>> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|ut| ut.job_id() == job_id)
            .cloned()
            .collect()
    }

    fn query_user(&self, username: &str) -> Vec<UserTask<T>> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|ut| ut.username() == username)
            .cloned()
            .collect()
    }

    fn query(&self, username: &str, job_id: &JobId) -> Option<UserTask<T>> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(username.to_string(), job_id.clone()))
            .cloned()
    }

    fn is_empty(&self) -> bool {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    fn task_count(&self) -> usize {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn add_listener(&self, listener: Arc<dyn TaskStoreListener<T>>) {
        self.observable.add_listener(listener);
    }
}

/// No-op store handed out when task tracking is disabled
///
/// Behaviorally indistinguishable from "tracking off": stores and removes
/// are swallowed, queries come back empty, listeners are never called.
pub struct EmptyTaskStore<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EmptyTaskStore<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for EmptyTaskStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> TaskStore<T> for EmptyTaskStore<T> {
    fn store(&self, _username: &str, _job_id: JobId, _task: T) {}

    fn remove(&self, _username: &str, _job_id: &JobId) {}

    fn query_all(&self) -> Vec<UserTask<T>> {
        Vec::new()
    }

    fn query_job(&self, _job_id: &JobId) -> Vec<UserTask<T>> {
        Vec::new()
    }

    fn query_user(&self, _username: &str) -> Vec<UserTask<T>> {
        Vec::new()
    }

    fn query(&self, _username: &str, _job_id: &JobId) -> Option<UserTask<T>> {
        None
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn task_count(&self) -> usize {
        0
    }

    fn add_listener(&self, _listener: Arc<dyn TaskStoreListener<T>>) {}
}
