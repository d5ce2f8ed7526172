//! Progress value model
//!
//! A [`Progress`] is an immutable `(current, volume)` pair. A volume of
//! [`UNKNOWN_VOLUME`] marks an unbounded task; unknown is absorbing under
//! aggregation, so a single unbounded child makes the whole subtree
//! unbounded.

use serde::Serialize;

/// Sentinel volume for tasks whose total size is not yet determinable
pub const UNKNOWN_VOLUME: i64 = -1;

/// Immutable `(current, volume)` progress pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    current: i64,
    volume: i64,
}

impl Progress {
    pub fn new(current: i64, volume: i64) -> Self {
        Self { current, volume }
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    pub fn has_unknown_volume(&self) -> bool {
        self.volume == UNKNOWN_VOLUME
    }

    /// Fraction complete in `[0, 1]`, clamped; `None` for unknown volume
    pub fn relative_progress(&self) -> Option<f64> {
        if self.has_unknown_volume() {
            return None;
        }
        if self.current >= self.volume {
            return Some(1.0);
        }
        Some(self.current as f64 / self.volume as f64)
    }

    /// Whole percentage in `[0, 100]`
    ///
    /// With unknown volume any progress at all reads as 100 and no
    /// progress as 0; the task is never "complete" in the strict sense.
    pub fn percentage(&self) -> i64 {
        if self.has_unknown_volume() {
            return if self.current > 0 { 100 } else { 0 };
        }
        if self.current >= self.volume {
            return 100;
        }
        self.current * 100 / self.volume
    }

    /// Sum two progress values; unknown volume is absorbing
    pub fn combine(self, other: Progress) -> Progress {
        let volume = if self.has_unknown_volume() || other.has_unknown_volume() {
            UNKNOWN_VOLUME
        } else {
            self.volume + other.volume
        };
        Progress {
            current: self.current + other.current,
            volume,
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current: 0,
            volume: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_progress_clamps() {
        assert_eq!(Progress::new(5, 10).relative_progress(), Some(0.5));
        assert_eq!(Progress::new(15, 10).relative_progress(), Some(1.0));
        assert_eq!(Progress::new(3, UNKNOWN_VOLUME).relative_progress(), None);
    }

    #[test]
    fn test_percentage_with_unknown_volume() {
        assert_eq!(Progress::new(0, UNKNOWN_VOLUME).percentage(), 0);
        assert_eq!(Progress::new(1, UNKNOWN_VOLUME).percentage(), 100);
    }

    #[test]
    fn test_percentage_floors_and_clamps() {
        assert_eq!(Progress::new(1, 3).percentage(), 33);
        assert_eq!(Progress::new(999, 1000).percentage(), 99);
        assert_eq!(Progress::new(1200, 1000).percentage(), 100);
        // zero-volume work is vacuously done
        assert_eq!(Progress::new(0, 0).percentage(), 100);
    }

    #[test]
    fn test_combine_sums_both_sides() {
        let combined = Progress::new(5, 10).combine(Progress::new(2, 10));
        assert_eq!(combined, Progress::new(7, 20));
    }

    // Unknown poisons the sum regardless of position
    #[test]
    fn test_combine_unknown_is_absorbing() {
        let parts = [
            Progress::new(5, 10),
            Progress::new(3, UNKNOWN_VOLUME),
            Progress::new(2, 10),
        ];
        let total = parts.into_iter().fold(Progress::default(), Progress::combine);
        assert_eq!(total, Progress::new(10, UNKNOWN_VOLUME));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Progress::new(1, 2), Progress::new(1, 2));
        assert_ne!(Progress::new(1, 2), Progress::new(1, 3));
    }
}
