//! Task lifecycle states and the legal transition table

use serde::{Deserialize, Serialize};

/// Lifecycle state of a task
///
/// Legal transitions: Pending → {Running, Canceled};
/// Running → {Finished, Canceled, Failed}. The three terminal states
/// accept no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Initial state, not yet started
    #[default]
    Pending,
    /// Being worked on
    Running,
    /// Successfully completed
    Finished,
    /// Cancelled before completion
    Canceled,
    /// Failed with error
    Failed,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Pending,
        Status::Running,
        Status::Finished,
        Status::Canceled,
        Status::Failed,
    ];

    /// States reachable from `self` in one step
    pub fn valid_transitions(self) -> &'static [Status] {
        match self {
            Status::Pending => &[Status::Running, Status::Canceled],
            Status::Running => &[Status::Finished, Status::Canceled, Status::Failed],
            Status::Finished | Status::Canceled | Status::Failed => &[],
        }
    }

    /// Whether moving from `self` to `to` is legal
    pub fn can_transition(self, to: Status) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Whether this state accepts no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Finished | Status::Canceled | Status::Failed)
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Status::Pending => 0,
            Status::Running => 1,
            Status::Finished => 2,
            Status::Canceled => 3,
            Status::Failed => 4,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Status {
        match value {
            0 => Status::Pending,
            1 => Status::Running,
            2 => Status::Finished,
            3 => Status::Canceled,
            _ => Status::Failed,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Running => write!(f, "running"),
            Status::Finished => write!(f, "finished"),
            Status::Canceled => write!(f, "canceled"),
            Status::Failed => write!(f, "failed"),
        }
    }
}
