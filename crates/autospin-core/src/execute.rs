use tracing::{info, warn};

use autospin_model::ClusterParams;
use autospin_scheduler::{JobSubmission, SchedulerClient};

use crate::expand::DesiredJobs;
use crate::reconcile::Classification;
use crate::report::{ActionKind, ActionOutcome};

/// Submit every missing job, then cancel every zombie.
///
/// Best effort: a failed action is recorded and the remaining ones still run.
/// This is the only caller of the scheduler's mutating operations.
pub async fn execute(
    client: &dyn SchedulerClient,
    cluster: &ClusterParams,
    desired: &DesiredJobs,
    plan: &Classification,
) -> Vec<ActionOutcome> {
    let mut outcomes = Vec::with_capacity(plan.action_count());
    let system = cluster.system_name.as_str();

    for name in &plan.missing {
        let Some(script) = desired.script(name.as_str()) else {
            outcomes.push(ActionOutcome::failed(
                name.clone(),
                ActionKind::Submit,
                "no rendered script",
            ));
            continue;
        };
        let job = JobSubmission {
            system,
            name,
            script,
            account: &cluster.account,
            working_dir: &cluster.working_dir,
        };
        match client.submit(job).await {
            Ok(job_id) => {
                info!(job = %name, job_id = ?job_id.map(|id| id.get()), "submitted");
                outcomes.push(ActionOutcome::succeeded(name.clone(), ActionKind::Submit, job_id));
            }
            Err(e) => {
                warn!(job = %name, error = %e, "submit failed");
                outcomes.push(ActionOutcome::failed(name.clone(), ActionKind::Submit, e.to_string()));
            }
        }
    }

    for zombie in &plan.zombie {
        match client.cancel(system, zombie.id).await {
            Ok(()) => {
                info!(job = %zombie.name, job_id = %zombie.id, "cancelled");
                outcomes.push(ActionOutcome::succeeded(
                    zombie.name.clone(),
                    ActionKind::Cancel,
                    Some(zombie.id),
                ));
            }
            Err(e) => {
                warn!(job = %zombie.name, job_id = %zombie.id, error = %e, "cancel failed");
                outcomes.push(ActionOutcome::failed(
                    zombie.name.clone(),
                    ActionKind::Cancel,
                    e.to_string(),
                ));
            }
        }
    }

    outcomes
}
