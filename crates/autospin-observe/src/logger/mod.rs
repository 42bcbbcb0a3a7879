mod config;
mod error;
mod format;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

use std::io;

use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Install the global tracing subscriber described by `cfg`.
///
/// Call once, before the runtime starts: the local UTC offset can only be read reliably
/// while the process is single-threaded.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = cfg.env_filter()?;

    let layer: BoxedLayer = match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(local_timer())
            .with_filter(filter)
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(cfg.with_targets)
            .with_timer(local_timer())
            .with_filter(filter)
            .boxed(),
        LoggerFormat::Journald => journald_layer()?.with_filter(filter).boxed(),
    };

    tracing_subscriber::registry().with(layer).try_init()?;
    Ok(())
}

fn local_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer() -> Result<tracing_journald::Layer, LoggerError> {
    tracing_journald::layer().map_err(LoggerError::Journald)
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer() -> Result<BoxedLayer, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let cfg = LoggerConfig::default().with_level("warn");
        let _ = logger_init(&cfg);
        assert!(matches!(logger_init(&cfg), Err(LoggerError::Install(_))));
    }

    #[test]
    fn invalid_filter_fails_before_install() {
        let cfg = LoggerConfig::default().with_level("autospin=loud");
        assert!(matches!(logger_init(&cfg), Err(LoggerError::InvalidFilter { .. })));
    }

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_requires_the_feature() {
        let cfg = LoggerConfig::default().with_format(LoggerFormat::Journald);
        assert!(matches!(logger_init(&cfg), Err(LoggerError::JournaldNotSupported)));
    }
}
