use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use tracing::trace;

use autospin_model::{JobId, JobState, ObservedJob};

use crate::client::{JobSubmission, SchedulerClient, SystemInfo};
use crate::errors::SchedulerError;

/// In-process scheduler keeping jobs in memory.
///
/// Submitted jobs become `PENDING` under their submission name and
/// cancelled jobs turn `CANCELLED`, so consecutive passes observe each other's effects.
/// Failures can be injected per call kind or per job.
#[derive(Default)]
pub struct MemoryScheduler {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    systems: Vec<String>,
    jobs: Vec<ObservedJob>,
    next_id: u64,
    submitted: Vec<String>,
    cancelled: Vec<JobId>,
    list_calls: usize,
    fail_listing: bool,
    fail_submit: HashSet<String>,
    fail_cancel: HashSet<JobId>,
}

impl MemoryScheduler {
    /// Scheduler exposing a single system.
    pub fn new(system: impl Into<String>) -> Self {
        let sched = Self::default();
        {
            let mut inner = sched.lock();
            inner.systems.push(system.into());
            inner.next_id = 1000;
        }
        sched
    }

    /// Seed an existing job.
    pub fn with_job(self, job: ObservedJob) -> Self {
        {
            let mut inner = self.lock();
            inner.next_id = inner.next_id.max(job.id.get() + 1);
            inner.jobs.push(job);
        }
        self
    }

    /// Make every `list_jobs` call fail.
    pub fn failing_listing(self) -> Self {
        self.lock().fail_listing = true;
        self
    }

    /// Make submissions of the job called `name` fail.
    pub fn failing_submit(self, name: impl Into<String>) -> Self {
        self.lock().fail_submit.insert(name.into());
        self
    }

    /// Make cancellation of job `id` fail.
    pub fn failing_cancel(self, id: JobId) -> Self {
        self.lock().fail_cancel.insert(id);
        self
    }

    /// Names of successfully submitted jobs, in call order.
    pub fn submitted(&self) -> Vec<String> {
        self.lock().submitted.clone()
    }

    /// Ids of successfully cancelled jobs, in call order.
    pub fn cancelled(&self) -> Vec<JobId> {
        self.lock().cancelled.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    /// Snapshot of every job, whatever its state.
    pub fn jobs(&self) -> Vec<ObservedJob> {
        self.lock().jobs.clone()
    }

    /// Move job `id` to `state`, simulating scheduler-side progress.
    pub fn set_state(&self, id: JobId, state: JobState) {
        let mut inner = self.lock();
        if let Some(job) = inner.jobs.iter_mut().find(|j| j.id == id) {
            job.state = state;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn ensure_system(&self, system: &str) -> Result<(), SchedulerError> {
        if self.systems.iter().any(|s| s == system) {
            Ok(())
        } else {
            Err(SchedulerError::Status {
                status: 404,
                body: format!("system {system} not found"),
            })
        }
    }
}

#[async_trait]
impl SchedulerClient for MemoryScheduler {
    async fn systems(&self) -> Result<Vec<SystemInfo>, SchedulerError> {
        let inner = self.lock();
        Ok(inner
            .systems
            .iter()
            .map(|name| SystemInfo { name: name.clone() })
            .collect())
    }

    async fn list_jobs(
        &self,
        system: &str,
        _all_users: bool,
    ) -> Result<Vec<ObservedJob>, SchedulerError> {
        let mut inner = self.lock();
        inner.list_calls += 1;
        inner.ensure_system(system)?;
        if inner.fail_listing {
            return Err(SchedulerError::Status {
                status: 503,
                body: "listing unavailable".into(),
            });
        }
        Ok(inner.jobs.clone())
    }

    async fn submit(&self, job: JobSubmission<'_>) -> Result<Option<JobId>, SchedulerError> {
        let mut inner = self.lock();
        inner.ensure_system(job.system)?;

        if job.script.is_empty() {
            return Err(SchedulerError::Status {
                status: 400,
                body: "empty batch script".into(),
            });
        }
        let name = job.name.to_string();
        if inner.fail_submit.contains(&name) {
            return Err(SchedulerError::Status {
                status: 500,
                body: format!("submit of {name} failed"),
            });
        }

        let id = JobId(inner.next_id);
        inner.next_id += 1;
        inner.jobs.push(ObservedJob::new(id, name.clone(), JobState::Pending));
        trace!(%id, %name, "memory scheduler queued job");
        inner.submitted.push(name);
        Ok(Some(id))
    }

    async fn cancel(&self, system: &str, job_id: JobId) -> Result<(), SchedulerError> {
        let mut inner = self.lock();
        inner.ensure_system(system)?;
        if inner.fail_cancel.contains(&job_id) {
            return Err(SchedulerError::Status {
                status: 500,
                body: format!("cancel of {job_id} failed"),
            });
        }
        let job = inner
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or_else(|| SchedulerError::Status {
                status: 404,
                body: format!("job {job_id} not found"),
            })?;
        job.state = JobState::Cancelled;
        inner.cancelled.push(job_id);
        Ok(())
    }
}
