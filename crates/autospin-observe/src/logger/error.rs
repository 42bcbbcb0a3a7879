use thiserror::Error;
use tracing_subscriber::{filter::ParseError, util::TryInitError};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown --log-format {0:?} (expected text, json or journald)")]
    InvalidFormat(String),

    #[error("--log-format journald needs a Linux build with the `journald` feature")]
    JournaldNotSupported,

    #[error("cannot connect to journald: {0}")]
    Journald(#[source] std::io::Error),

    #[error("invalid log filter {directive:?} (--log-level / AUTOSPIN_LOG): {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("global logger already installed: {0}")]
    Install(#[from] TryInitError),
}
