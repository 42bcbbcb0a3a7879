//! Fleet file loading and validation.
//!
//! The YAML document is first deserialized into loosely typed raw structs, then checked
//! field by field so that every problem is reported at once as a [`ConfigError::Validation`].

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use autospin_model::{ClusterParams, FleetConfig, ModelSpec, Secret, WallTime};

use crate::error::ConfigError;

/// Prefix marking a credential that must be read from the environment.
pub const ENV_INDIRECTION: &str = "env:";

/// Working directory used for submissions when the fleet file does not set one.
pub const DEFAULT_WORKING_DIR: &str = "/tmp";

#[derive(Deserialize)]
struct RawConfig {
    models: BTreeMap<String, RawModel>,
    client_id: String,
    client_secret: String,
    token_uri: String,
    firecrest_uri: String,
    system_name: String,
    account: String,
    bootstrap_addr: String,
    #[serde(default)]
    working_dir: Option<String>,
    #[serde(default)]
    template: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RawModel {
    #[serde(default)]
    instances: i64,
    #[serde(default)]
    model_name: Option<String>,
    model_path: String,
    model_args: String,
    sub_process: String,
    environment: String,
    serving_engine: String,
    time_limit: Scalar,
    ocf_version: Scalar,
}

/// YAML scalar accepted where a string is expected (`time_limit: 2`, `ocf_version: 2`).
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

/// Read and validate a fleet file, resolving `env:` credentials from the process environment.
///
/// A relative `template` path is resolved against the directory of the fleet file.
pub fn load_config(path: &Path) -> Result<FleetConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(&text, |var| std::env::var(var).ok())?;

    if let Some(template) = config.template.take() {
        let resolved = match path.parent() {
            Some(dir) if template.is_relative() => dir.join(template),
            _ => template,
        };
        config.template = Some(resolved);
    }
    debug!(
        path = %path.display(),
        models = config.models.len(),
        instances = config.total_instances(),
        "fleet config loaded"
    );
    Ok(config)
}

/// Parse and validate fleet YAML. `env` resolves `env:VAR` credentials.
pub fn parse_config<F>(text: &str, env: F) -> Result<FleetConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw: RawConfig =
        serde_yaml::from_str(text).map_err(|e| ConfigError::invalid(e.to_string()))?;

    let mut problems = Vec::new();

    let client_secret = resolve_secret(&raw.client_secret, &env).unwrap_or_else(|p| {
        problems.push(p);
        Secret::new(String::new())
    });

    for (field, value) in [
        ("client_id", &raw.client_id),
        ("token_uri", &raw.token_uri),
        ("firecrest_uri", &raw.firecrest_uri),
        ("system_name", &raw.system_name),
        ("account", &raw.account),
        ("bootstrap_addr", &raw.bootstrap_addr),
    ] {
        require_non_empty(field, value, &mut problems);
    }

    let working_dir = raw
        .working_dir
        .unwrap_or_else(|| DEFAULT_WORKING_DIR.to_string());
    if !working_dir.starts_with('/') {
        problems.push(format!("working_dir: must be an absolute path, got {working_dir:?}"));
    }

    let mut models = BTreeMap::new();
    for (id, raw_model) in raw.models {
        if let Some(spec) = validate_model(&id, raw_model, &mut problems) {
            models.insert(id, spec);
        }
    }

    if !problems.is_empty() {
        return Err(ConfigError::Validation { problems });
    }

    Ok(FleetConfig {
        models,
        cluster: ClusterParams {
            client_id: raw.client_id,
            client_secret,
            token_uri: raw.token_uri,
            firecrest_uri: raw.firecrest_uri,
            system_name: raw.system_name,
            account: raw.account,
            bootstrap_addr: raw.bootstrap_addr,
            working_dir,
        },
        template: raw.template,
    })
}

fn resolve_secret<F>(raw: &str, env: &F) -> Result<Secret, String>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(var) = raw.strip_prefix(ENV_INDIRECTION) else {
        if raw.is_empty() {
            return Err("client_secret: must not be empty".to_string());
        }
        return Ok(Secret::new(raw));
    };
    match env(var) {
        Some(value) if !value.is_empty() => Ok(Secret::new(value)),
        Some(_) => Err(format!("client_secret: environment variable {var} is empty")),
        None => Err(format!("client_secret: environment variable {var} is not set")),
    }
}

fn validate_model(id: &str, raw: RawModel, problems: &mut Vec<String>) -> Option<ModelSpec> {
    let before = problems.len();

    if !is_valid_model_id(id) {
        problems.push(format!(
            "models.{id:?}: model id must be non-empty and use only [A-Za-z0-9._-]"
        ));
    }

    let instances = match u32::try_from(raw.instances) {
        Ok(n) => n,
        Err(_) => {
            problems.push(format!(
                "models.{id}.instances: must be between 0 and {}, got {}",
                u32::MAX,
                raw.instances
            ));
            0
        }
    };

    for (field, value) in [
        ("model_path", &raw.model_path),
        ("sub_process", &raw.sub_process),
        ("environment", &raw.environment),
        ("serving_engine", &raw.serving_engine),
    ] {
        require_non_empty(&format!("models.{id}.{field}"), value, problems);
    }

    let ocf_version = raw.ocf_version.into_string();
    require_non_empty(&format!("models.{id}.ocf_version"), &ocf_version, problems);

    let time_limit = match WallTime::parse(&raw.time_limit.into_string()) {
        Ok(t) => Some(t),
        Err(e) => {
            problems.push(format!("models.{id}.time_limit: {e}"));
            None
        }
    };

    if problems.len() > before {
        return None;
    }
    Some(ModelSpec {
        instances,
        model_name: raw
            .model_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_string()),
        model_path: raw.model_path,
        model_args: raw.model_args,
        sub_process: raw.sub_process,
        environment: raw.environment,
        serving_engine: raw.serving_engine,
        time_limit: time_limit?,
        ocf_version,
    })
}

fn require_non_empty(field: &str, value: &str, problems: &mut Vec<String>) {
    if value.trim().is_empty() {
        problems.push(format!("{field}: must not be empty"));
    }
}

fn is_valid_model_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
