use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use autospin_model::{JobId, JobName, ObservedJob};

use crate::errors::SchedulerError;

/// A cluster/system known to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub name: String,
}

/// Everything the scheduler needs to queue one batch script.
#[derive(Debug, Clone, Copy)]
pub struct JobSubmission<'a> {
    pub system: &'a str,
    /// Name the job is queued under. Passed to the scheduler explicitly, so the job stays
    /// observable by name even when the script has no `--job-name` directive.
    pub name: &'a JobName,
    pub script: &'a str,
    pub account: &'a str,
    pub working_dir: &'a str,
}

/// Remote job-control API.
///
/// Only `systems` and `list_jobs` are read-only; `submit` and `cancel` mutate cluster state
/// and are called exclusively by the action executor.
#[async_trait]
pub trait SchedulerClient: Send + Sync {
    /// Systems (clusters) reachable through this client.
    async fn systems(&self) -> Result<Vec<SystemInfo>, SchedulerError>;

    /// Jobs on `system`. With `all_users = false` only the caller's own jobs are returned.
    async fn list_jobs(
        &self,
        system: &str,
        all_users: bool,
    ) -> Result<Vec<ObservedJob>, SchedulerError>;

    /// Queue a batch script. The scheduler may or may not report the new id synchronously.
    async fn submit(&self, job: JobSubmission<'_>) -> Result<Option<JobId>, SchedulerError>;

    /// Cancel a job by scheduler id.
    async fn cancel(&self, system: &str, job_id: JobId) -> Result<(), SchedulerError>;
}
