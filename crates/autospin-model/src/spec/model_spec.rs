use serde::Serialize;

use crate::{InstanceIndex, WallTime};

/// Desired state of one model in the fleet.
///
/// Built by the config loader after validation; immutable for the rest of a pass.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ModelSpec {
    /// Number of instances to keep alive. `0` disables the model without removing its entry.
    pub instances: InstanceIndex,
    /// Human-facing model name (defaults to the model id).
    pub model_name: String,
    /// Checkpoint path or hub id passed to the serving engine.
    pub model_path: String,
    /// Extra arguments appended to the serve command.
    pub model_args: String,
    /// Serve command run under the orchestration binary (e.g. `"sp serve"`).
    pub sub_process: String,
    /// Container environment file (`#SBATCH --environment`).
    pub environment: String,
    /// Serving engine identifier (`sp`, `vllm`, `sglang`, ...).
    pub serving_engine: String,
    /// Wall-clock limit of each job.
    pub time_limit: WallTime,
    /// Version tag of the orchestration subprocess binary.
    pub ocf_version: String,
}

impl ModelSpec {
    /// Instance indices this model contributes: `0..instances`.
    pub fn indices(&self) -> std::ops::Range<InstanceIndex> {
        0..self.instances
    }

    pub fn is_disabled(&self) -> bool {
        self.instances == 0
    }
}
