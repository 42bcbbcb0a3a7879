/// Reserved job-name prefix marking jobs owned by autospin.
///
/// Must never change: jobs submitted under an older prefix would become invisible to the reconciler.
pub const JOB_PREFIX: &str = "+as-";
