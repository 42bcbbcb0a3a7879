use std::fmt;

use serde::Serialize;

use autospin_model::{JobId, JobName};

use crate::pass::PassMode;
use crate::reconcile::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Submit,
    Cancel,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Submit => "submit",
            ActionKind::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ActionResult {
    /// `job_id` is the id assigned on submit (if reported) or the cancelled id.
    Succeeded { job_id: Option<JobId> },
    Failed { reason: String },
}

/// Outcome of one submit or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub name: JobName,
    pub kind: ActionKind,
    #[serde(flatten)]
    pub result: ActionResult,
}

impl ActionOutcome {
    pub fn succeeded(name: JobName, kind: ActionKind, job_id: Option<JobId>) -> Self {
        Self {
            name,
            kind,
            result: ActionResult::Succeeded { job_id },
        }
    }

    pub fn failed(name: JobName, kind: ActionKind, reason: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            result: ActionResult::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, ActionResult::Succeeded { .. })
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.result, self.kind) {
            (ActionResult::Succeeded { job_id: Some(id) }, ActionKind::Submit) => {
                write!(f, "scheduled  {} (job {id})", self.name)
            }
            (ActionResult::Succeeded { job_id: None }, ActionKind::Submit) => {
                write!(f, "scheduled  {}", self.name)
            }
            (ActionResult::Succeeded { job_id }, ActionKind::Cancel) => match job_id {
                Some(id) => write!(f, "cancelled  {} (job {id})", self.name),
                None => write!(f, "cancelled  {}", self.name),
            },
            (ActionResult::Failed { reason }, kind) => {
                write!(f, "failed     {} ({}: {reason})", self.name, kind.as_str())
            }
        }
    }
}

/// Aggregate counts of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub desired: usize,
    pub active: usize,
    pub missing: usize,
    pub zombie: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "desired={} active={} missing={} zombie={} succeeded={} failed={}",
            self.desired, self.active, self.missing, self.zombie, self.succeeded, self.failed
        )
    }
}

/// Everything one pass saw and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub system: String,
    pub mode: PassMode,
    pub desired: usize,
    #[serde(flatten)]
    pub classification: Classification,
    /// Submissions first, then cancellations. Empty on dry runs.
    pub outcomes: Vec<ActionOutcome>,
}

impl PassReport {
    pub fn summary(&self) -> PassSummary {
        let succeeded = self.outcomes.iter().filter(|o| o.is_success()).count();
        PassSummary {
            desired: self.desired,
            active: self.classification.active.len(),
            missing: self.classification.missing.len(),
            zombie: self.classification.zombie.len(),
            succeeded,
            failed: self.outcomes.len() - succeeded,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_success())
    }

    /// One line per classified job, then one per action taken.
    pub fn status_lines(&self) -> Vec<String> {
        let c = &self.classification;
        let mut lines = Vec::with_capacity(c.active.len() + c.action_count() + self.outcomes.len());
        lines.extend(c.active.iter().map(|n| format!("running    {n}")));
        lines.extend(c.missing.iter().map(|n| format!("missing    {n}")));
        lines.extend(c.zombie.iter().map(|z| format!("zombie     {} (job {})", z.name, z.id)));
        lines.extend(self.outcomes.iter().map(ToString::to_string));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ZombieJob;

    fn name(s: &str) -> JobName {
        JobName::parse_owned(s).unwrap()
    }

    fn report() -> PassReport {
        PassReport {
            system: "daint".into(),
            mode: PassMode::Apply,
            desired: 3,
            classification: Classification {
                active: [name("+as-a-0")].into(),
                missing: [name("+as-a-1"), name("+as-a-2")].into(),
                zombie: vec![ZombieJob {
                    name: name("+as-b-0"),
                    id: JobId(42),
                }],
            },
            outcomes: vec![
                ActionOutcome::succeeded(name("+as-a-1"), ActionKind::Submit, Some(JobId(100))),
                ActionOutcome::failed(name("+as-a-2"), ActionKind::Submit, "quota"),
                ActionOutcome::succeeded(name("+as-b-0"), ActionKind::Cancel, Some(JobId(42))),
            ],
        }
    }

    #[test]
    fn summary_counts() {
        let r = report();
        assert_eq!(
            r.summary(),
            PassSummary {
                desired: 3,
                active: 1,
                missing: 2,
                zombie: 1,
                succeeded: 2,
                failed: 1,
            }
        );
        assert!(r.has_failures());
    }

    #[test]
    fn status_lines_cover_every_job_and_action() {
        let lines = report().status_lines();
        assert_eq!(
            lines,
            vec![
                "running    +as-a-0",
                "missing    +as-a-1",
                "missing    +as-a-2",
                "zombie     +as-b-0 (job 42)",
                "scheduled  +as-a-1 (job 100)",
                "failed     +as-a-2 (submit: quota)",
                "cancelled  +as-b-0 (job 42)",
            ]
        );
    }

    #[test]
    fn json_shape() {
        let v = serde_json::to_value(report()).unwrap();
        assert_eq!(v["mode"], "apply");
        assert_eq!(v["missing"][0], "+as-a-1");
        assert_eq!(v["zombie"][0]["id"], 42);
        assert_eq!(v["outcomes"][1]["result"], "failed");
        assert_eq!(v["outcomes"][1]["reason"], "quota");
        assert_eq!(v["outcomes"][0]["job_id"], 100);
    }
}
