use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ModelError;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Job wall-clock limit, rendered in Slurm `H:MM:SS` form.
///
/// Accepted inputs:
/// - `H:MM:SS` and `D-H:MM:SS`
/// - compact durations such as `2h`, `1h30m`, `90m`, `45s`, `1d12h`
/// - a bare number, read as hours
///
/// Overflowing seconds and minutes are carried (`90m` renders as `1:30:00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime {
    seconds: u64,
}

impl WallTime {
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn as_secs(&self) -> u64 {
        self.seconds
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let input = raw.trim();
        let invalid = || ModelError::InvalidWallTime(raw.to_string());

        let seconds = if input.contains(':') {
            parse_clock(input).ok_or_else(invalid)?
        } else {
            parse_compact(input).ok_or_else(invalid)?
        };
        if seconds == 0 {
            return Err(invalid());
        }
        Ok(Self { seconds })
    }
}

fn parse_clock(input: &str) -> Option<u64> {
    let (days, clock) = match input.split_once('-') {
        Some((d, rest)) => (parse_digits(d)?, rest),
        None => (0, input),
    };
    let mut parts = clock.split(':');
    let h = parse_digits(parts.next()?)?;
    let m = parse_digits(parts.next()?)?;
    let s = parse_digits(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    [(days, DAY), (h, HOUR), (m, MINUTE), (s, 1)]
        .into_iter()
        .try_fold(0u64, |total, (n, unit)| total.checked_add(n.checked_mul(unit)?))
}

fn parse_compact(input: &str) -> Option<u64> {
    if input.is_empty() {
        return None;
    }
    let mut total = 0u64;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let num: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit = match rest.chars().next() {
            Some('d') => DAY,
            Some('h') => HOUR,
            Some('m') => MINUTE,
            Some('s') => 1,
            None => HOUR,
            Some(_) => return None,
        };
        if !rest.is_empty() {
            rest = &rest[1..];
        }
        total = total.checked_add(num.checked_mul(unit)?)?;
    }
    Some(total)
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / HOUR;
        let minutes = (self.seconds % HOUR) / MINUTE;
        let seconds = self.seconds % MINUTE;
        write!(f, "{hours}:{minutes:02}:{seconds:02}")
    }
}

impl FromStr for WallTime {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WallTime::parse(s)
    }
}

impl Serialize for WallTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        WallTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}
