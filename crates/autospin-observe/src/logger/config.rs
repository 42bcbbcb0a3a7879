use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::logger::{error::LoggerError, format::LoggerFormat};

/// How the `autospin` binary logs. Records always go to stderr; stdout carries status lines.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `"info"` or `"autospin_core=debug,warn"`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LoggerFormat) -> Self {
        self.format = format;
        self
    }

    pub(crate) fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(&self.level).map_err(|source| LoggerError::InvalidFilter {
            directive: self.level.clone(),
            source,
        })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: false,
            use_color: std::io::stderr().is_terminal(),
        }
    }
}
