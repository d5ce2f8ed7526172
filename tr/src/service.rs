//! Per-database holder of task stores
//!
//! One process typically serves several logical databases; each gets its
//! own [`LocalTaskStore`]. The service is constructor-injected wherever it
//! is needed so tests can create isolated instances, and it has explicit
//! teardown (`purge`, `clear`) instead of living in a static map.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::registry::TaskHandle;
use crate::store::{EmptyTaskStore, LocalTaskStore, TaskStore};

/// Hands out one store per database name, or no-op stores when disabled
pub struct TaskStoreService<T> {
    enabled: bool,
    stores: RwLock<HashMap<String, Arc<LocalTaskStore<T>>>>,
}

impl<T: TaskHandle> TaskStoreService<T> {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// The store for `database`, created on first use
    ///
    /// Database names are case-insensitive. When the service is disabled
    /// every caller gets an [`EmptyTaskStore`].
    pub fn get_task_store(&self, database: &str) -> Arc<dyn TaskStore<T>> {
        if !self.enabled {
            return Arc::new(EmptyTaskStore::new());
        }
        let key = database.to_lowercase();
        if let Some(store) = self.stores.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            return Arc::clone(store) as Arc<dyn TaskStore<T>>;
        }
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        let store = stores.entry(key).or_insert_with(|| {
            debug!(database, "creating task store");
            Arc::new(LocalTaskStore::new())
        });
        Arc::clone(store) as Arc<dyn TaskStore<T>>
    }

    /// Drop the store for `database`, notifying its listeners
    pub fn purge(&self, database: &str) {
        let key = database.to_lowercase();
        let removed = self
            .stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        if let Some(store) = removed {
            debug!(database, "purging task store");
            store.clear();
        }
    }

    /// Drop every store, notifying each store's listeners
    pub fn clear(&self) {
        let stores = std::mem::take(&mut *self.stores.write().unwrap_or_else(PoisonError::into_inner));
        for store in stores.values() {
            store.clear();
        }
    }

    /// Number of databases currently holding a store
    pub fn database_count(&self) -> usize {
        self.stores.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
