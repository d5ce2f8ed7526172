//! Session-facing registry handles and their factories
//!
//! A [`TaskRegistry`] binds a `(username, job_id)` pair to a store and is
//! the handle an algorithm actually holds while it runs. Factories create
//! registries per job and enforce the duplicate-job guard.

use std::sync::Arc;

use thiserror::Error;

use crate::job::JobId;
use crate::store::{EmptyTaskStore, TaskStore};

/// Identity comparison for stored task payloads
///
/// Registries compare by *identity*, not equality: two structurally equal
/// tasks from different runs must not be confused. `Arc<T>` gets this for
/// free via pointer identity.
pub trait TaskHandle: Clone + Send + Sync + 'static {
    /// Whether `self` and `other` are the same task instance
    fn same(&self, other: &Self) -> bool;
}

impl<T: Send + Sync + 'static> TaskHandle for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

/// Errors raised by registry factories
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a task for user '{username}' with job id '{job_id}' is already registered")]
    DuplicateJob { username: String, job_id: JobId },
}

/// Handle binding `(username, job_id)` to a task store
#[derive(Clone)]
pub struct TaskRegistry<T> {
    username: String,
    job_id: JobId,
    store: Arc<dyn TaskStore<T>>,
}

impl<T> std::fmt::Debug for TaskRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("username", &self.username)
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}

impl<T: TaskHandle> TaskRegistry<T> {
    pub fn new(username: impl Into<String>, job_id: JobId, store: Arc<dyn TaskStore<T>>) -> Self {
        Self {
            username: username.into(),
            job_id,
            store,
        }
    }

    /// A registry backed by the no-op store ("tracking off")
    pub fn empty() -> Self {
        Self {
            username: String::new(),
            job_id: JobId::empty(),
            store: Arc::new(EmptyTaskStore::new()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Make `task` visible to observers under this registry's key
    pub fn register_task(&self, task: T) {
        self.store.store(&self.username, self.job_id.clone(), task);
    }

    /// Remove this registry's task from the store
    pub fn unregister_task(&self) {
        self.store.remove(&self.username, &self.job_id);
    }

    /// Whether exactly this task instance is currently registered
    pub fn contains_task(&self, task: &T) -> bool {
        self.store
            .query(&self.username, &self.job_id)
            .is_some_and(|ut| ut.task().same(task))
    }
}

/// Creates a registry per job for a fixed user/store pair
pub trait TaskRegistryFactory<T>: Send + Sync {
    /// Create a registry for `job_id`, rejecting duplicates
    fn new_instance(&self, job_id: JobId) -> Result<TaskRegistry<T>, RegistryError>;
}

/// Factory bound to a username and a concrete store
pub struct LocalTaskRegistryFactory<T> {
    username: String,
    store: Arc<dyn TaskStore<T>>,
}

impl<T: TaskHandle> LocalTaskRegistryFactory<T> {
    pub fn new(username: impl Into<String>, store: Arc<dyn TaskStore<T>>) -> Self {
        Self {
            username: username.into(),
            store,
        }
    }
}

impl<T: TaskHandle> TaskRegistryFactory<T> for LocalTaskRegistryFactory<T> {
    fn new_instance(&self, job_id: JobId) -> Result<TaskRegistry<T>, RegistryError> {
        if self.store.query(&self.username, &job_id).is_some() {
            return Err(RegistryError::DuplicateJob {
                username: self.username.clone(),
                job_id,
            });
        }
        Ok(TaskRegistry::new(self.username.clone(), job_id, Arc::clone(&self.store)))
    }
}

/// Factory producing no-op registries when tracking is disabled
pub struct EmptyTaskRegistryFactory;

impl<T: TaskHandle> TaskRegistryFactory<T> for EmptyTaskRegistryFactory {
    fn new_instance(&self, _job_id: JobId) -> Result<TaskRegistry<T>, RegistryError> {
        Ok(TaskRegistry::empty())
    }
}
