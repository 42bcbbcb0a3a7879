use anyhow::Result;

use autospin_model::FleetConfig;

use super::load_fleet;
use crate::{Context, OutputFormat};

pub fn execute(ctx: &Context) -> Result<()> {
    let (config, _) = load_fleet(ctx)?;
    match ctx.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config.models)?),
        OutputFormat::Text => {
            for line in model_lines(&config) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn model_lines(config: &FleetConfig) -> Vec<String> {
    let width = config.models.keys().map(String::len).max().unwrap_or(0);
    let mut lines: Vec<String> = config
        .models
        .iter()
        .map(|(id, spec)| {
            format!(
                "{id:<width$}  x{:<3} {:<8} {:>9}  {}",
                spec.instances,
                spec.serving_engine,
                spec.time_limit.to_string(),
                spec.model_name
            )
        })
        .collect();
    lines.push(format!(
        "{} models, {} jobs",
        config.models.len(),
        config.total_instances()
    ));
    lines
}
