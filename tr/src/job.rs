//! Job identity and the user/job/task association record
//!
//! A [`JobId`] is an opaque, globally unique string. Freshly generated ids
//! are UUID v7 so they sort roughly by creation time; callers may also
//! bring their own id (e.g. one supplied by a driver program).

use uuid::Uuid;

/// Opaque, globally unique job identifier
///
/// Equality is on the string value. [`JobId::empty`] is a reserved
/// sentinel used where no real job exists (disabled tracking).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh unique job id
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// The reserved empty sentinel
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Create from an existing id string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the id string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for JobId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self(s))
    }
}

/// Immutable association of a username, a job id and a task payload
///
/// The natural key for storage and querying is `(username, job_id)`.
#[derive(Debug, Clone)]
pub struct UserTask<T> {
    username: String,
    job_id: JobId,
    task: T,
}

impl<T> UserTask<T> {
    /// Create a new association record
    pub fn new(username: impl Into<String>, job_id: JobId, task: T) -> Self {
        Self {
            username: username.into(),
            job_id,
            task,
        }
    }

    /// The owning username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The job this task belongs to
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// The tracked task payload
    pub fn task(&self) -> &T {
        &self.task
    }

    /// Consume the record, yielding the task payload
    pub fn into_task(self) -> T {
        self.task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_unique() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_job_id_equality_on_value() {
        let a = JobId::from("job-1");
        let b = JobId::from_string("job-1".to_string());
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "job-1");
    }

    #[test]
    fn test_job_id_empty_sentinel() {
        let empty = JobId::empty();
        assert!(empty.is_empty());
        assert_eq!(empty, JobId::from(""));
    }

    #[test]
    fn test_job_id_serde_as_plain_string() {
        let id = JobId::from("job-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"job-42\"");
        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_user_task_accessors() {
        let ut = UserTask::new("alice", JobId::from("job-1"), 7_u32);
        assert_eq!(ut.username(), "alice");
        assert_eq!(ut.job_id().as_str(), "job-1");
        assert_eq!(*ut.task(), 7);
        assert_eq!(ut.into_task(), 7);
    }
}
