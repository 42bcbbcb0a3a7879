use serde::{Deserialize, Serialize};

use crate::{JobId, JobState, is_owned};

/// A job as reported by the scheduler. Read-only for autospin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedJob {
    pub id: JobId,
    pub name: String,
    pub state: JobState,
}

impl ObservedJob {
    pub fn new(id: JobId, name: impl Into<String>, state: JobState) -> Self {
        Self {
            id,
            name: name.into(),
            state,
        }
    }

    /// Returns `true` if the job name carries the reserved prefix.
    pub fn is_owned(&self) -> bool {
        is_owned(&self.name)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
