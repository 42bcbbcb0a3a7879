use std::{collections::BTreeMap, path::PathBuf};

use serde::Serialize;

use crate::{InstanceIndex, JobName, ModelId, ModelSpec, Secret};

/// Cluster-wide parameters shared by every job of the fleet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClusterParams {
    pub client_id: String,
    /// Already resolved: `env:VAR` indirections are substituted at load time.
    #[serde(skip)]
    pub client_secret: Secret,
    pub token_uri: String,
    pub firecrest_uri: String,
    pub system_name: String,
    pub account: String,
    pub bootstrap_addr: String,
    /// Working directory used for every submission.
    pub working_dir: String,
}

/// Validated fleet description: the whole desired state of one pass.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FleetConfig {
    /// Ordered so that every derived collection iterates deterministically.
    pub models: BTreeMap<ModelId, ModelSpec>,
    pub cluster: ClusterParams,
    /// Job-script template file; `None` selects the built-in template.
    pub template: Option<PathBuf>,
}

/// One desired unit of the fleet.
#[derive(Clone, Copy, Debug)]
pub struct Instance<'a> {
    pub model_id: &'a str,
    pub spec: &'a ModelSpec,
    pub index: InstanceIndex,
}

impl Instance<'_> {
    pub fn job_name(&self) -> JobName {
        JobName::for_instance(self.model_id, self.index)
    }
}

impl FleetConfig {
    /// Iterate all desired units, model by model, index ascending.
    pub fn instances(&self) -> impl Iterator<Item = Instance<'_>> {
        self.models.iter().flat_map(|(model_id, spec)| {
            spec.indices().map(move |index| Instance {
                model_id: model_id.as_str(),
                spec,
                index,
            })
        })
    }

    /// Total number of desired jobs.
    pub fn total_instances(&self) -> usize {
        self.models.values().map(|m| m.instances as usize).sum()
    }

    pub fn model(&self, id: &str) -> Option<&ModelSpec> {
        self.models.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WallTime;

    fn spec(instances: u32) -> ModelSpec {
        ModelSpec {
            instances,
            model_name: "m".into(),
            model_path: "/models/m".into(),
            model_args: String::new(),
            sub_process: "sp serve".into(),
            environment: "/env/sp.toml".into(),
            serving_engine: "sp".into(),
            time_limit: WallTime::from_secs(3600),
            ocf_version: "v2".into(),
        }
    }

    fn fleet(models: &[(&str, u32)]) -> FleetConfig {
        FleetConfig {
            models: models
                .iter()
                .map(|(id, n)| (id.to_string(), spec(*n)))
                .collect(),
            cluster: ClusterParams {
                client_id: "id".into(),
                client_secret: Secret::new("secret"),
                token_uri: "https://auth/token".into(),
                firecrest_uri: "https://api".into(),
                system_name: "daint".into(),
                account: "a01".into(),
                bootstrap_addr: "/ip4/127.0.0.1/tcp/1".into(),
                working_dir: "/tmp".into(),
            },
            template: None,
        }
    }

    #[test]
    fn instances_enumerate_every_index() {
        let f = fleet(&[("llama", 2), ("qwen", 1)]);
        let names: Vec<String> = f.instances().map(|i| i.job_name().to_string()).collect();
        assert_eq!(names, vec!["+as-llama-0", "+as-llama-1", "+as-qwen-0"]);
        assert_eq!(f.total_instances(), 3);
    }

    #[test]
    fn zero_instances_contribute_nothing() {
        let f = fleet(&[("off", 0), ("on", 1)]);
        assert!(f.model("off").unwrap().is_disabled());
        assert_eq!(f.instances().count(), 1);
    }

    #[test]
    fn secret_is_not_serialized() {
        let f = fleet(&[("llama", 1)]);
        let json = serde_json::to_string(&f).unwrap();
        assert!(!json.contains("secret\""));
        assert!(!json.contains("client_secret"));
    }
}
