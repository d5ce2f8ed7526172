//! Memory ranges and per-job memory accounting
//!
//! [`MemoryRange`] is the narrow boundary type the estimation machinery
//! hands over; [`TaskMemoryContainer`] books reserved memory per
//! `(username, job id)` so administrators can see who holds what.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::job::JobId;

/// Estimated memory footprint in bytes, as a `[min, max]` interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryRange {
    pub min: u64,
    pub max: u64,
}

impl MemoryRange {
    /// A fixed-size range where min == max
    pub fn of(value: u64) -> Self {
        Self { min: value, max: value }
    }

    pub fn of_range(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// The empty range, used when no estimate exists
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.min == 0 && self.max == 0
    }
}

impl std::fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.min == self.max {
            write!(f, "{} bytes", self.min)
        } else {
            write!(f, "[{}, {}] bytes", self.min, self.max)
        }
    }
}

/// Books reserved memory per `(username, job id)`
///
/// `remove` returns `None` when the job was never reserved, so callers can
/// tell "nothing to release" apart from a zero-byte reservation.
#[derive(Debug, Default)]
pub struct TaskMemoryContainer {
    total: u64,
    reserved: HashMap<String, HashMap<JobId, u64>>,
}

impl TaskMemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `memory` bytes for `(username, job_id)`, replacing any
    /// previous reservation for that job
    pub fn reserve(&mut self, username: &str, job_id: JobId, memory: u64) {
        let user = self.reserved.entry(username.to_string()).or_default();
        if let Some(previous) = user.insert(job_id, memory) {
            self.total -= previous;
        }
        self.total += memory;
    }

    /// Release the reservation for `(username, job_id)`
    ///
    /// Returns the released amount, or `None` when no reservation existed.
    pub fn remove(&mut self, username: &str, job_id: &JobId) -> Option<u64> {
        let user = self.reserved.get_mut(username)?;
        let released = user.remove(job_id)?;
        if user.is_empty() {
            self.reserved.remove(username);
        }
        self.total -= released;
        Some(released)
    }

    /// Sum of all outstanding reservations
    pub fn total_memory(&self) -> u64 {
        self.total
    }

    /// Outstanding reservations for one user
    pub fn user_memory(&self, username: &str) -> u64 {
        self.reserved
            .get(username)
            .map(|jobs| jobs.values().sum())
            .unwrap_or(0)
    }

    /// Usernames with at least one outstanding reservation
    pub fn users(&self) -> Vec<&str> {
        self.reserved.keys().map(String::as_str).collect()
    }
}
