//! `reconcile` and `plan`: one convergence pass against the live cluster.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use tracing::{info, warn};

use autospin_core::{PassLock, PassMode, PassReport, run_pass};
use autospin_prometheus::PassMetrics;
use autospin_scheduler::{FirecrestClient, SchedulerConfig};

use super::load_fleet;
use crate::{Context, OutputFormat};

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Classify only; do not submit or cancel.
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero when any submit or cancel failed.
    #[arg(long)]
    pub strict: bool,

    /// Advisory lock file; a second pass holding it makes this one exit.
    #[arg(long)]
    pub lock_file: Option<PathBuf>,

    /// Write Prometheus text-format metrics of the pass to this file.
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    #[command(flatten)]
    pub scheduler: SchedulerArgs,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub scheduler: SchedulerArgs,
}

#[derive(Debug, Args)]
pub struct SchedulerArgs {
    /// Timeout of each scheduler request in milliseconds.
    #[arg(long, default_value_t = SchedulerConfig::DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

pub async fn execute(args: ReconcileArgs, ctx: &Context) -> Result<()> {
    let _lock = match &args.lock_file {
        Some(path) => Some(PassLock::try_acquire(path)?),
        None => None,
    };

    let mode = if args.dry_run {
        PassMode::DryRun
    } else {
        PassMode::Apply
    };
    let report = pass(ctx, mode, &args.scheduler).await?;

    if let Some(path) = &args.metrics_file {
        let metrics = PassMetrics::new()?;
        metrics.observe(&report);
        metrics.write_textfile(path)?;
    }

    if args.strict && report.has_failures() {
        bail!("{} action(s) failed", report.summary().failed);
    }
    Ok(())
}

pub async fn plan(args: PlanArgs, ctx: &Context) -> Result<()> {
    pass(ctx, PassMode::DryRun, &args.scheduler).await.map(drop)
}

async fn pass(ctx: &Context, mode: PassMode, sched: &SchedulerArgs) -> Result<PassReport> {
    let (config, template) = load_fleet(ctx)?;

    let scheduler_cfg =
        SchedulerConfig::from_cluster(&config.cluster).with_timeout_ms(sched.timeout_ms);
    let client = FirecrestClient::connect(&scheduler_cfg)
        .await
        .context("connecting to the scheduler")?;

    let report = run_pass(&client, &config, &template, mode).await?;
    print_report(&report, ctx.output)?;

    let summary = report.summary();
    if summary.failed > 0 {
        warn!(%summary, "pass finished with failed actions");
    } else {
        info!(%summary, "pass finished");
    }
    Ok(report)
}

fn print_report(report: &PassReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            for line in report.status_lines() {
                println!("{line}");
            }
            println!("{}", report.summary());
        }
    }
    Ok(())
}
