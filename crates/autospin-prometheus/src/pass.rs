use std::{
    fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use prometheus::{Encoder, IntGaugeVec, Opts, Registry, TextEncoder};
use tracing::debug;

use autospin_core::{ActionResult, PassReport};

use crate::error::MetricsError;

/// Gauges describing the most recent pass.
#[derive(Clone)]
pub struct PassMetrics {
    registry: Registry,
    jobs: IntGaugeVec,
    actions: IntGaugeVec,
    last_pass: IntGaugeVec,
}

impl PassMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let jobs = IntGaugeVec::new(
            Opts::new("autospin_jobs", "Jobs per reconciliation class"),
            &["system", "state"],
        )?;
        registry.register(Box::new(jobs.clone()))?;

        let actions = IntGaugeVec::new(
            Opts::new("autospin_actions", "Submit/cancel actions issued by the last pass"),
            &["system", "kind", "result"],
        )?;
        registry.register(Box::new(actions.clone()))?;

        let last_pass = IntGaugeVec::new(
            Opts::new(
                "autospin_last_pass_timestamp_seconds",
                "Unix time the last pass finished",
            ),
            &["system"],
        )?;
        registry.register(Box::new(last_pass.clone()))?;

        Ok(Self {
            registry,
            jobs,
            actions,
            last_pass,
        })
    }

    /// Record `report`, replacing whatever the previous observation set.
    pub fn observe(&self, report: &PassReport) {
        let summary = report.summary();
        let system = report.system.as_str();

        for (state, value) in [
            ("desired", summary.desired),
            ("active", summary.active),
            ("missing", summary.missing),
            ("zombie", summary.zombie),
        ] {
            self.jobs.with_label_values(&[system, state]).set(as_gauge(value));
        }

        self.actions.reset();
        for outcome in &report.outcomes {
            let result = match outcome.result {
                ActionResult::Succeeded { .. } => "succeeded",
                ActionResult::Failed { .. } => "failed",
            };
            self.actions
                .with_label_values(&[system, outcome.kind.as_str(), result])
                .inc();
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.last_pass
            .with_label_values(&[system])
            .set(i64::try_from(now).unwrap_or(i64::MAX));
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|_| MetricsError::Encoding)
    }

    /// Write the exposition to `path` through a sibling temp file and a rename, so a
    /// collector never reads a half-written file.
    pub fn write_textfile(&self, path: &Path) -> Result<(), MetricsError> {
        let text = self.render()?;
        let io_err = |source| MetricsError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;

        debug!(path = %path.display(), "metrics written");
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn as_gauge(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
