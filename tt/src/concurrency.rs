//! Requested concurrency of a tracked computation
//!
//! The tracked work may run on many threads; progress batching is tuned by
//! this value so the total number of emitted lines stays roughly constant
//! regardless of worker count.

use std::num::NonZeroUsize;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("concurrency must be at least 1, got {value}")]
pub struct InvalidConcurrency {
    value: usize,
}

/// Validated worker count, always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Concurrency(NonZeroUsize);

impl Concurrency {
    pub fn new(value: usize) -> Result<Self, InvalidConcurrency> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or(InvalidConcurrency { value })
    }

    /// Single-threaded execution
    pub fn single() -> Self {
        Self(NonZeroUsize::MIN)
    }

    pub fn value(self) -> usize {
        self.0.get()
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::single()
    }
}

impl std::fmt::Display for Concurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
