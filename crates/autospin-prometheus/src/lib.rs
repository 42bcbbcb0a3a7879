//! Prometheus metrics for reconciliation passes.
//!
//! A pass is a short-lived process, so nothing is scraped directly: [`PassMetrics`] turns a
//! [`autospin_core::PassReport`] into gauges and writes them in text exposition format,
//! typically into the node-exporter textfile collector directory.
//!
//! ## Metrics
//! - `autospin_jobs{system, state}` - Gauge (`desired`, `active`, `missing`, `zombie`)
//! - `autospin_actions{system, kind, result}` - Gauge, actions of the last pass
//! - `autospin_last_pass_timestamp_seconds{system}` - Gauge

mod error;
pub use error::MetricsError;

mod pass;
pub use pass::PassMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
