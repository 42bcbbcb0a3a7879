use anyhow::{Context, Result};
use clap::Parser;

use autospin_cli::{Cli, Commands, commands};
use autospin_observe::logger_init;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger_init(&cli.logger_config()).context("initializing logger")?;
    let ctx = cli.context();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Reconcile(args) => commands::reconcile::execute(args, &ctx).await,
            Commands::Plan(args) => commands::reconcile::plan(args, &ctx).await,
            Commands::Render(args) => commands::render::execute(&args, &ctx),
            Commands::Models => commands::models::execute(&ctx),
            Commands::Validate => commands::validate::execute(&ctx),
        }
    })
}
