use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle state of a scheduler job, as reported by the scheduler.
///
/// Only [`JobState::Pending`] and [`JobState::Running`] count as live for reconciliation;
/// everything else, including states this enum does not know, is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobState {
    /// Queued, waiting for resources.
    Pending,
    /// Currently executing.
    Running,
    Completing,
    Completed,
    Cancelled,
    Failed,
    Timeout,
    /// Temporarily stopped by the scheduler.
    Suspended,
    /// Any other scheduler state, kept verbatim.
    Other(String),
}

impl JobState {
    /// Parse a scheduler state string.
    ///
    /// Slurm occasionally appends detail (`"CANCELLED by 1234"`); only the first word is matched.
    pub fn parse(raw: &str) -> Self {
        let word = raw.split_whitespace().next().unwrap_or("");
        match word.to_ascii_uppercase().as_str() {
            "PENDING" => JobState::Pending,
            "RUNNING" => JobState::Running,
            "COMPLETING" => JobState::Completing,
            "COMPLETED" => JobState::Completed,
            "CANCELLED" => JobState::Cancelled,
            "FAILED" => JobState::Failed,
            "TIMEOUT" => JobState::Timeout,
            "SUSPENDED" => JobState::Suspended,
            _ => JobState::Other(raw.to_string()),
        }
    }

    /// Returns `true` if the job still occupies its name (pending or running).
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Pending | JobState::Running)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Completing => "COMPLETING",
            JobState::Completed => "COMPLETED",
            JobState::Cancelled => "CANCELLED",
            JobState::Failed => "FAILED",
            JobState::Timeout => "TIMEOUT",
            JobState::Suspended => "SUSPENDED",
            JobState::Other(raw) => raw,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(JobState::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_states() {
        assert!(JobState::Pending.is_active());
        assert!(JobState::Running.is_active());

        assert!(!JobState::Completing.is_active());
        assert!(!JobState::Completed.is_active());
        assert!(!JobState::Cancelled.is_active());
        assert!(!JobState::Failed.is_active());
        assert!(!JobState::Suspended.is_active());
        assert!(!JobState::Other("NODE_FAIL".into()).is_active());
    }

    #[test]
    fn parse_ignores_case_and_detail() {
        assert_eq!(JobState::parse("running"), JobState::Running);
        assert_eq!(JobState::parse("CANCELLED by 4242"), JobState::Cancelled);
        assert_eq!(
            JobState::parse("OUT_OF_MEMORY"),
            JobState::Other("OUT_OF_MEMORY".into())
        );
        assert_eq!(JobState::parse(""), JobState::Other(String::new()));
    }

    #[test]
    fn serde_uses_scheduler_spelling() {
        let json = serde_json::to_string(&JobState::Pending).unwrap();
        assert_eq!(json, r#""PENDING""#);

        let back: JobState = serde_json::from_str(r#""RUNNING""#).unwrap();
        assert_eq!(back, JobState::Running);
    }
}
