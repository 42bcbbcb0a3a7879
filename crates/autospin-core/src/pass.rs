use serde::Serialize;
use tracing::{info, instrument};

use autospin_model::FleetConfig;
use autospin_scheduler::SchedulerClient;

use crate::collect::{collect_active, ensure_system};
use crate::error::PassError;
use crate::execute::execute;
use crate::expand::expand;
use crate::reconcile::Classification;
use crate::report::PassReport;
use crate::template::ScriptTemplate;

/// Whether a pass may mutate the cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassMode {
    #[default]
    Apply,
    /// Classify only; no submit or cancel is issued.
    DryRun,
}

/// Run one convergence pass: expand, verify system, collect, classify, act.
///
/// Every error returned here happens before the first mutating call. Failures of
/// individual actions are recorded in the report instead.
#[instrument(level = "info", skip_all, fields(system = %config.cluster.system_name, ?mode))]
pub async fn run_pass(
    client: &dyn SchedulerClient,
    config: &FleetConfig,
    template: &ScriptTemplate,
    mode: PassMode,
) -> Result<PassReport, PassError> {
    let system = config.cluster.system_name.as_str();

    let desired = expand(config, template)?;
    ensure_system(client, system).await?;
    let observed = collect_active(client, system).await?;

    let classification = Classification::classify(&desired, &observed);
    info!(
        desired = desired.len(),
        active = classification.active.len(),
        missing = classification.missing.len(),
        zombie = classification.zombie.len(),
        "cluster state classified"
    );

    let outcomes = match mode {
        PassMode::Apply => execute(client, &config.cluster, &desired, &classification).await,
        PassMode::DryRun => Vec::new(),
    };

    Ok(PassReport {
        system: system.to_string(),
        mode,
        desired: desired.len(),
        classification,
        outcomes,
    })
}
