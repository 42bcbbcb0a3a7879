use std::collections::{BTreeMap, btree_map::Entry};

use tracing::{debug, trace};

use autospin_model::{FleetConfig, Instance, JobName};

use crate::error::ExpandError;
use crate::template::{ScriptTemplate, TemplateParams};

/// Desired jobs of one pass: job name → rendered batch script.
///
/// Ordered by name; identical fleet input yields an identical map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredJobs {
    jobs: BTreeMap<JobName, String>,
}

impl DesiredJobs {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// Rendered script for `name`.
    pub fn script(&self, name: &str) -> Option<&str> {
        self.jobs.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &JobName> {
        self.jobs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobName, &str)> {
        self.jobs.iter().map(|(k, v)| (k, v.as_str()))
    }
}

impl FromIterator<(JobName, String)> for DesiredJobs {
    fn from_iter<I: IntoIterator<Item = (JobName, String)>>(iter: I) -> Self {
        Self {
            jobs: iter.into_iter().collect(),
        }
    }
}

/// Variables available to the job-script template for one instance.
pub fn job_params(config: &FleetConfig, instance: &Instance<'_>) -> TemplateParams {
    let spec = instance.spec;
    let cluster = &config.cluster;

    [
        ("job_name", instance.job_name().to_string()),
        ("model_id", instance.model_id.to_string()),
        ("instance", instance.index.to_string()),
        ("instances", spec.instances.to_string()),
        ("model_name", spec.model_name.clone()),
        ("model_path", spec.model_path.clone()),
        ("model_args", spec.model_args.clone()),
        ("sub_process", spec.sub_process.clone()),
        ("environment", spec.environment.clone()),
        ("serving_engine", spec.serving_engine.clone()),
        ("time_limit", spec.time_limit.to_string()),
        ("ocf_version", spec.ocf_version.clone()),
        ("bootstrap_addr", cluster.bootstrap_addr.clone()),
        ("account", cluster.account.clone()),
        ("system_name", cluster.system_name.clone()),
        ("working_dir", cluster.working_dir.clone()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Render every desired instance of the fleet.
///
/// A render failure aborts the whole expansion; no partial map is returned.
pub fn expand(config: &FleetConfig, template: &ScriptTemplate) -> Result<DesiredJobs, ExpandError> {
    let mut jobs = BTreeMap::new();

    for instance in config.instances() {
        let params = job_params(config, &instance);
        let script = template
            .render(&params)
            .map_err(|source| ExpandError::Template {
                model: instance.model_id.to_string(),
                source,
            })?;

        match jobs.entry(instance.job_name()) {
            Entry::Vacant(slot) => {
                trace!(job = %slot.key(), "rendered job script");
                slot.insert(script);
            }
            Entry::Occupied(slot) => return Err(ExpandError::DuplicateName(slot.key().clone())),
        }
    }

    debug!(
        template = template.name(),
        jobs = jobs.len(),
        "fleet expanded"
    );
    Ok(DesiredJobs { jobs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::error::TemplateError;

    fn fleet(models: &[(&str, u32)]) -> FleetConfig {
        let mut text = String::from(if models.is_empty() { "models: {}\n" } else { "models:\n" });
        for (id, n) in models {
            text.push_str(&format!(
                "  {id}:\n    instances: {n}\n    model_path: /m/{id}\n    model_args: --tp 4\n    \
                 sub_process: sp serve\n    environment: /env/sp.toml\n    serving_engine: sp\n    \
                 time_limit: 2h\n    ocf_version: v2\n"
            ));
        }
        text.push_str(
            "client_id: c\nclient_secret: s\ntoken_uri: https://t\nfirecrest_uri: https://f\n\
             system_name: daint\naccount: a09\nbootstrap_addr: /ip4/1.2.3.4/tcp/1\n",
        );
        parse_config(&text, |_| None).unwrap()
    }

    #[test]
    fn produces_one_distinct_name_per_instance() {
        let cfg = fleet(&[("llama", 3), ("qwen", 2), ("off", 0)]);
        let desired = expand(&cfg, &ScriptTemplate::builtin().unwrap()).unwrap();

        assert_eq!(desired.len(), cfg.total_instances());
        let names: Vec<&str> = desired.names().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["+as-llama-0", "+as-llama-1", "+as-llama-2", "+as-qwen-0", "+as-qwen-1"]
        );
        assert!(!names.iter().any(|n| n.contains("off")));
    }

    #[test]
    fn scripts_carry_instance_and_cluster_values() {
        let cfg = fleet(&[("llama", 1)]);
        let desired = expand(&cfg, &ScriptTemplate::builtin().unwrap()).unwrap();
        let script = desired.script("+as-llama-0").unwrap();

        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("#SBATCH --job-name=+as-llama-0\n"));
        assert!(script.contains("#SBATCH --time=2:00:00\n"));
        assert!(script.contains("#SBATCH --account=a09\n"));
        assert!(script.contains("--bootstrap.addr /ip4/1.2.3.4/tcp/1"));
        assert!(script.contains("\"sp serve /m/llama --tp 4\""));
        assert!(!script.contains("{{"));
    }

    #[test]
    fn expansion_is_deterministic() {
        let cfg = fleet(&[("b", 2), ("a", 1)]);
        let template = ScriptTemplate::builtin().unwrap();
        assert_eq!(expand(&cfg, &template).unwrap(), expand(&cfg, &template).unwrap());
    }

    #[test]
    fn missing_variable_aborts_expansion() {
        let cfg = fleet(&[("llama", 1)]);
        let template = ScriptTemplate::parse("bad.sh", "{{ job_name }} {{ gpu_count }}").unwrap();
        let err = expand(&cfg, &template).unwrap_err();
        assert!(matches!(
            err,
            ExpandError::Template { ref model, source: TemplateError::MissingVariable { ref name, .. } }
                if model == "llama" && name == "gpu_count"
        ));
    }

    #[test]
    fn empty_fleet_expands_to_nothing() {
        let cfg = fleet(&[]);
        assert!(expand(&cfg, &ScriptTemplate::builtin().unwrap()).unwrap().is_empty());
    }
}
