//! # autospin
//!
//! Keeps a fleet of model-serving jobs alive on a Slurm cluster behind FirecREST.
//! Each invocation runs at most one reconciliation pass; schedule it with cron or a timer.
//!
//! ## Commands
//!
//! - `autospin reconcile` - converge the cluster toward the fleet file
//! - `autospin plan` - show what `reconcile` would do
//! - `autospin render <job>` - print the batch script of one desired job
//! - `autospin models` - list the fleet
//! - `autospin validate` - check the fleet file and template offline
//!
//! ## Environment
//!
//! - `AUTOSPIN_CONFIG` - fleet file (default `autospin.yaml`)
//! - `AUTOSPIN_LOG` - log filter directive (default `info`)

#![forbid(unsafe_code)]

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use autospin_observe::{LoggerConfig, LoggerFormat};

/// Desired-state reconciler for model-serving jobs.
#[derive(Debug, Parser)]
#[command(name = "autospin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Fleet file.
    #[arg(long, short = 'c', env = "AUTOSPIN_CONFIG", default_value = "autospin.yaml")]
    pub config: PathBuf,

    /// Log filter, e.g. `debug` or `autospin_core=trace,warn`.
    #[arg(long, env = "AUTOSPIN_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format: text, json or journald.
    #[arg(long, default_value = "text")]
    pub log_format: LoggerFormat,

    /// Output format of stdout.
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig::default()
            .with_level(self.log_level.clone())
            .with_format(self.log_format)
    }

    pub fn context(&self) -> Context {
        Context {
            config: self.config.clone(),
            output: self.output,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Converge the cluster toward the fleet file.
    Reconcile(commands::reconcile::ReconcileArgs),
    /// Classify cluster jobs without submitting or cancelling anything.
    Plan(commands::reconcile::PlanArgs),
    /// Print the rendered batch script of one desired job.
    Render(commands::render::RenderArgs),
    /// List the models of the fleet.
    Models,
    /// Load the fleet file and render every script, without contacting the cluster.
    Validate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: PathBuf,
    pub output: OutputFormat,
}
