mod constants;
pub use constants::JOB_PREFIX;

mod job_id;
pub use job_id::JobId;

mod job_name;
pub use job_name::{JobName, is_owned};

mod job_state;
pub use job_state::JobState;

mod observed_job;
pub use observed_job::ObservedJob;

mod secret;
pub use secret::Secret;

mod wall_time;
pub use wall_time::WallTime;

/// Identifier of a model entry in the fleet file (the key under `models`).
pub type ModelId = String;

/// Zero-based index of one instance of a model.
pub type InstanceIndex = u32;
