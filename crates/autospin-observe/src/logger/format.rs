use std::{fmt, str::FromStr};

use crate::logger::error::LoggerError;

/// Log record encoding, selected with `--log-format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggerFormat {
    /// Human-readable lines; colored when stderr is a terminal.
    #[default]
    Text,
    /// One JSON object per record, for log shippers.
    Json,
    /// Native journald fields. Only available with the `journald` feature on Linux.
    Journald,
}

impl LoggerFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LoggerFormat::Text, LoggerFormat::Json, LoggerFormat::Journald]
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LoggerError::InvalidFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_every_format() {
        for format in [LoggerFormat::Text, LoggerFormat::Json, LoggerFormat::Journald] {
            assert_eq!(format.to_string().parse::<LoggerFormat>().unwrap(), format);
        }
        assert_eq!(" JSON ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
    }

    #[test]
    fn rejects_unknown_format() {
        let err = "xml".parse::<LoggerFormat>().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidFormat(ref s) if s == "xml"));
        assert!(err.to_string().contains("--log-format"));
    }
}
