use std::path::PathBuf;

use thiserror::Error;

use autospin_model::JobName;
use autospin_scheduler::SchedulerError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {}", .problems.join("; "))]
    Validation { problems: Vec<String> },
}

impl ConfigError {
    pub(crate) fn invalid(problem: impl Into<String>) -> Self {
        ConfigError::Validation {
            problems: vec![problem.into()],
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template {template}: unterminated placeholder at byte {offset}")]
    Unterminated { template: String, offset: usize },

    #[error("template {template}: invalid placeholder {{{{{placeholder}}}}}")]
    InvalidPlaceholder { template: String, placeholder: String },

    #[error("template {template}: missing variable `{name}`")]
    MissingVariable { template: String, name: String },

    #[error("template {template}: job scripts must reference {{{{ job_name }}}}")]
    NoJobName { template: String },
}

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("rendering job script for model {model}: {source}")]
    Template {
        model: String,
        #[source]
        source: TemplateError,
    },

    #[error("job name {0} produced twice")]
    DuplicateName(JobName),
}

/// Listing the scheduler's jobs failed; the pass must not act on a partial view.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("cluster query failed on {system}: {source}")]
    Query {
        system: String,
        #[source]
        source: SchedulerError,
    },
}

#[derive(Debug, Error)]
pub enum PassError {
    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error("cannot list scheduler systems: {0}")]
    Systems(#[source] SchedulerError),

    #[error("system {system} not found (available: {})", .available.join(", "))]
    SystemNotFound {
        system: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Collect(#[from] CollectError),
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another reconciliation pass holds {0}")]
    Held(PathBuf),

    #[error("lock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
