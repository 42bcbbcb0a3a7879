use anyhow::Result;
use tracing::info;

use autospin_core::expand;

use super::load_fleet;
use crate::Context;

/// Offline check: the fleet file parses and every desired job renders.
pub fn execute(ctx: &Context) -> Result<()> {
    let (config, template) = load_fleet(ctx)?;
    let desired = expand(&config, &template)?;

    info!(template = template.name(), "template variables: {}", template.variables().join(", "));
    println!(
        "{}: {} models, {} jobs, template {}",
        ctx.config.display(),
        config.models.len(),
        desired.len(),
        template.name()
    );
    Ok(())
}
