use anyhow::{Result, anyhow};
use clap::Args;

use autospin_core::{ScriptTemplate, expand};
use autospin_model::FleetConfig;

use super::load_fleet;
use crate::Context;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Desired job name, e.g. `+as-llama-0`.
    pub job: String,
}

pub fn execute(args: &RenderArgs, ctx: &Context) -> Result<()> {
    let (config, template) = load_fleet(ctx)?;
    print!("{}", render_job(&config, &template, &args.job)?);
    Ok(())
}

/// Script of the desired job `job`.
pub fn render_job(config: &FleetConfig, template: &ScriptTemplate, job: &str) -> Result<String> {
    let desired = expand(config, template)?;
    desired
        .script(job)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("{job} is not a desired job of this fleet"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::fleet_file;

    #[test]
    fn renders_desired_job() {
        let (_dir, ctx) = fleet_file();
        let (config, template) = load_fleet(&ctx).unwrap();

        let script = render_job(&config, &template, "+as-llama-1").unwrap();
        assert!(script.contains("#SBATCH --job-name=+as-llama-1"));

        let err = render_job(&config, &template, "+as-llama-2").unwrap_err();
        assert!(err.to_string().contains("+as-llama-2"));
    }
}
