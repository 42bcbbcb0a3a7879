use tracing::{debug, instrument};

use autospin_model::ObservedJob;
use autospin_scheduler::SchedulerClient;

use crate::error::{CollectError, PassError};

/// Snapshot the caller's live jobs (PENDING or RUNNING) on `system`.
///
/// Read-only. Any listing failure is returned as-is: a partial view would turn live jobs
/// into false zombies or missing jobs into duplicates.
#[instrument(level = "debug", skip(client))]
pub async fn collect_active(
    client: &dyn SchedulerClient,
    system: &str,
) -> Result<Vec<ObservedJob>, CollectError> {
    let jobs = client
        .list_jobs(system, false)
        .await
        .map_err(|source| CollectError::Query {
            system: system.to_string(),
            source,
        })?;

    let total = jobs.len();
    let active: Vec<ObservedJob> = jobs.into_iter().filter(ObservedJob::is_active).collect();
    debug!(total, active = active.len(), "collected cluster state");
    Ok(active)
}

/// Fail with [`PassError::SystemNotFound`] unless the scheduler knows `system`.
pub async fn ensure_system(client: &dyn SchedulerClient, system: &str) -> Result<(), PassError> {
    let systems = client.systems().await.map_err(PassError::Systems)?;
    if systems.iter().any(|s| s.name == system) {
        return Ok(());
    }
    Err(PassError::SystemNotFound {
        system: system.to_string(),
        available: systems.into_iter().map(|s| s.name).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use autospin_model::{JobId, JobState};
    use autospin_scheduler::MemoryScheduler;

    #[tokio::test]
    async fn keeps_only_pending_and_running() {
        let sched = MemoryScheduler::new("daint")
            .with_job(ObservedJob::new(JobId(1), "+as-a-0", JobState::Running))
            .with_job(ObservedJob::new(JobId(2), "+as-a-1", JobState::Pending))
            .with_job(ObservedJob::new(JobId(3), "+as-a-2", JobState::Completed))
            .with_job(ObservedJob::new(JobId(4), "+as-a-3", JobState::Cancelled))
            .with_job(ObservedJob::new(JobId(5), "+as-a-4", JobState::Other("NODE_FAIL".into())));

        let active = collect_active(&sched, "daint").await.unwrap();
        let ids: Vec<u64> = active.iter().map(|j| j.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(sched.cancelled().is_empty() && sched.submitted().is_empty());
    }

    #[tokio::test]
    async fn listing_failure_is_a_query_error() {
        let sched = MemoryScheduler::new("daint").failing_listing();
        let err = collect_active(&sched, "daint").await.unwrap_err();
        assert!(matches!(err, CollectError::Query { ref system, .. } if system == "daint"));
    }

    #[tokio::test]
    async fn unknown_system_is_reported_with_alternatives() {
        let sched = MemoryScheduler::new("daint");
        ensure_system(&sched, "daint").await.unwrap();

        let err = ensure_system(&sched, "eiger").await.unwrap_err();
        assert!(matches!(
            err,
            PassError::SystemNotFound { ref system, ref available }
                if system == "eiger" && available == &vec!["daint".to_string()]
        ));
    }
}
