use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

use crate::{InstanceIndex, JOB_PREFIX, ModelError};

/// Name of a job owned by autospin: `<prefix><model-id>-<instance>`.
///
/// Within one fleet the mapping `(model-id, instance)` to name is injective:
/// the instance is always rendered as plain decimal after the last `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    /// Build the name of instance `index` of model `model_id`.
    pub fn for_instance(model_id: &str, index: InstanceIndex) -> Self {
        Self(format!("{JOB_PREFIX}{model_id}-{index}"))
    }

    /// Wrap a scheduler-reported name, rejecting names without the reserved prefix.
    pub fn parse_owned(name: &str) -> Result<Self, ModelError> {
        if is_owned(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(ModelError::NotOwned(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` if a scheduler job name carries the reserved prefix.
#[inline]
pub fn is_owned(name: &str) -> bool {
    name.starts_with(JOB_PREFIX)
}

impl Borrow<str> for JobName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for JobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_layout() {
        let name = JobName::for_instance("llama", 0);
        assert_eq!(name.as_str(), "+as-llama-0");
        assert!(is_owned(name.as_str()));
    }

    #[test]
    fn dashed_model_ids_do_not_collide() {
        // "a-1" instance 0 vs "a" instance 10
        let left = JobName::for_instance("a-1", 0);
        let right = JobName::for_instance("a", 10);
        assert_ne!(left, right);
        assert_eq!(left.as_str(), "+as-a-1-0");
        assert_eq!(right.as_str(), "+as-a-10");
    }

    #[test]
    fn parse_owned_rejects_foreign_names() {
        assert!(JobName::parse_owned("+as-qwen-3").is_ok());
        assert_eq!(
            JobName::parse_owned("other-team-job"),
            Err(ModelError::NotOwned("other-team-job".into()))
        );
        // prefix must be at the start
        assert!(!is_owned("x+as-llama-0"));
    }
}
