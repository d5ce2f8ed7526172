//! Throttled percentage logging
//!
//! Raw progress increments arrive far too often to print. They are
//! accumulated locally and flushed into a shared counter once a batch is
//! full; the batch size is tuned so a full run emits on the order of 100
//! percentage lines regardless of volume and worker count. Percentages
//! are monotonic and emitted at most once per value.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use super::ProgressLogger;
use super::error::LoggerError;
use super::sink::ProgressSink;
use crate::concurrency::Concurrency;
use crate::task::UNKNOWN_VOLUME;

/// Separator between path segments in composed task names
pub const TASK_SEPARATOR: &str = " :: ";

/// Batching percentage logger over a text sink
pub struct BatchingProgressLogger {
    sink: Arc<dyn ProgressSink>,
    task_name: String,
    task_volume: i64,
    concurrency: Concurrency,
    batch_size: i64,
    call_counter: i64,
    global_progress: AtomicI64,
    /// Highest percentage logged so far; nothing above it is ever repeated
    global_percentage: AtomicI64,
}

impl BatchingProgressLogger {
    pub fn new(sink: Arc<dyn ProgressSink>, task_name: impl Into<String>, volume: i64, concurrency: Concurrency) -> Self {
        Self {
            sink,
            task_name: task_name.into(),
            task_volume: volume,
            concurrency,
            batch_size: Self::calculate_batch_size(volume, concurrency),
            call_counter: 0,
            global_progress: AtomicI64::new(0),
            global_percentage: AtomicI64::new(0),
        }
    }

    /// Batch size targeting ~100 lines for the whole task
    ///
    /// `next_power_of_two(max(1, (volume / 100) / concurrency))`; an
    /// unknown volume degenerates to a batch of 1.
    pub fn calculate_batch_size(volume: i64, concurrency: Concurrency) -> i64 {
        let per_worker = (volume / 100) / concurrency.value() as i64;
        (per_worker.max(1) as u64).next_power_of_two() as i64
    }

    pub fn batch_size(&self) -> i64 {
        self.batch_size
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    fn log_progress_internal(&mut self, progress: i64, template: Option<&str>) {
        self.call_counter += progress;
        if self.call_counter < self.batch_size {
            return;
        }
        // Keep the fractional remainder as carry so no progress is lost
        let carry = self.call_counter % self.batch_size;
        let flushed = self.call_counter - carry;
        self.call_counter = carry;
        let global = self.global_progress.fetch_add(flushed, Ordering::AcqRel) + flushed;
        self.maybe_log_percentage(global, template);
    }

    fn maybe_log_percentage(&self, global: i64, template: Option<&str>) {
        let percentage = if self.task_volume == UNKNOWN_VOLUME {
            if global > 0 { 100 } else { 0 }
        } else if global >= self.task_volume {
            100
        } else {
            global * 100 / self.task_volume
        };
        let last = self.global_percentage.load(Ordering::Acquire);
        if percentage > last {
            self.emit_percentage(percentage, template);
            self.global_percentage.store(percentage, Ordering::Release);
        }
    }

    fn emit_percentage(&self, percentage: i64, template: Option<&str>) {
        let body = match template {
            Some(template) => template.replace("{}", &percentage.to_string()),
            None => format!("{percentage}%"),
        };
        if self.task_name.is_empty() {
            self.sink.info(&body);
        } else {
            self.sink.info(&format!("{} {body}", self.task_name));
        }
    }

    fn format_message(&self, message: &str) -> String {
        if self.task_name.is_empty() {
            message.to_string()
        } else {
            format!("{}{TASK_SEPARATOR}{message}", self.task_name)
        }
    }
}

impl ProgressLogger for BatchingProgressLogger {
    fn log_progress(&mut self, progress: i64) {
        self.log_progress_internal(progress, None);
    }

    fn log_progress_with_message(&mut self, progress: i64, template: &str) {
        self.log_progress_internal(progress, Some(template));
    }

    fn log_message(&self, message: &str) {
        self.sink.info(&self.format_message(message));
    }

    fn log_debug(&self, message: &str) {
        self.sink.debug(&self.format_message(message));
    }

    fn log_warning(&self, message: &str) {
        self.sink.warn(&self.format_message(message));
    }

    fn log_error(&self, message: &str) {
        self.sink.error(&self.format_message(message));
    }

    /// Force 100% if it has not been reached yet
    fn log_finish_percentage(&mut self) {
        let last = self.global_percentage.load(Ordering::Acquire);
        if last < 100 {
            self.emit_percentage(100, None);
            self.global_percentage.store(100, Ordering::Release);
        }
    }

    /// Start over for a new volume
    ///
    /// Recomputes the batch size, zeroes the counters and the percentage
    /// watermark, and returns the volume that was never accounted for.
    fn reset(&mut self, new_volume: i64) -> i64 {
        let remaining = self.task_volume - self.global_progress.load(Ordering::Acquire);
        self.task_volume = new_volume;
        self.batch_size = Self::calculate_batch_size(new_volume, self.concurrency);
        self.call_counter = 0;
        self.global_progress.store(0, Ordering::Release);
        self.global_percentage.store(0, Ordering::Release);
        remaining
    }

    fn start_subtask(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        if self.task_name.is_empty() {
            self.task_name = name.to_string();
        } else {
            self.task_name = format!("{}{TASK_SEPARATOR}{name}", self.task_name);
        }
    }

    fn finish_subtask(&mut self, name: &str) -> Result<(), LoggerError> {
        if name.is_empty() {
            return Ok(());
        }
        let suffix = format!("{TASK_SEPARATOR}{name}");
        if self.task_name.ends_with(&suffix) {
            let stripped = self.task_name.len() - suffix.len();
            self.task_name.truncate(stripped);
            Ok(())
        } else if self.task_name == name {
            self.task_name.clear();
            Ok(())
        } else {
            Err(LoggerError::UnknownSubtask {
                name: name.to_string(),
                path: self.task_name.clone(),
            })
        }
    }
}
