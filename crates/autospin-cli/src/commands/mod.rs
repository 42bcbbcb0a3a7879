//! Command implementations.

pub mod models;
pub mod reconcile;
pub mod render;
pub mod validate;

use anyhow::{Context as _, Result};

use autospin_core::{ScriptTemplate, load_config};
use autospin_model::FleetConfig;

use crate::Context;

/// Load the fleet file and the template it selects.
pub fn load_fleet(ctx: &Context) -> Result<(FleetConfig, ScriptTemplate)> {
    let config = load_config(&ctx.config)
        .with_context(|| format!("loading fleet file {}", ctx.config.display()))?;
    let template = ScriptTemplate::load(config.template.as_deref())?;
    Ok((config, template))
}
