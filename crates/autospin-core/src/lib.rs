//! Desired-state reconciliation of model-serving jobs.
//!
//! One pass loads the fleet file, renders one batch script per desired instance,
//! snapshots the scheduler's live jobs, classifies them and submits/cancels the difference:
//!
//! ```text
//! config ─► expand ─┐
//!                   ├─► reconcile ─► execute ─► PassReport
//! collect ──────────┘
//! ```

pub mod collect;
pub mod config;
pub mod error;
pub mod execute;
pub mod expand;
pub mod lock;
pub mod pass;
pub mod reconcile;
pub mod report;
pub mod template;

pub use config::{load_config, parse_config};
pub use error::{CollectError, ConfigError, ExpandError, LockError, PassError, TemplateError};
pub use expand::{DesiredJobs, expand};
pub use lock::PassLock;
pub use pass::{PassMode, run_pass};
pub use reconcile::{Classification, ZombieJob};
pub use report::{ActionKind, ActionOutcome, ActionResult, PassReport, PassSummary};
pub use template::{ScriptTemplate, TemplateParams};
