use autospin_model::{ClusterParams, Secret};

/// Connection settings for the FirecREST scheduler API.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// FirecREST base URL, e.g. `https://api.cscs.ch/hpc/firecrest/v2`.
    pub endpoint: String,
    /// OAuth2 token endpoint for the client-credentials grant.
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: Secret,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl SchedulerConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    pub fn from_cluster(cluster: &ClusterParams) -> Self {
        Self {
            endpoint: cluster.firecrest_uri.clone(),
            token_uri: cluster.token_uri.clone(),
            client_id: cluster.client_id.clone(),
            client_secret: cluster.client_secret.clone(),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}
