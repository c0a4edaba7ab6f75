//! Lifecycle configuration.
//!
//! # Responsibility
//! - Hold tunables for the recycle-bin lifecycle.
//! - Parse human-entered retention durations (`30d`, `12h`, `90m`, `45s`).
//!
//! # Invariants
//! - The retention window is always strictly positive.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Default recycle-bin retention.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,9})\s*([dhms])\s*$").expect("valid duration regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDuration(String),
    NonPositiveRetention(i64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDuration(value) => write!(
                f,
                "invalid retention window `{value}`; expected <number><d|h|m|s>, e.g. 30d"
            ),
            Self::NonPositiveRetention(ms) => {
                write!(f, "retention window must be positive, got {ms}ms")
            }
        }
    }
}

impl Error for ConfigError {}

/// Tunables for `LifecycleManager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    retention_window_ms: i64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            retention_window_ms: DEFAULT_RETENTION_DAYS * MS_PER_DAY,
        }
    }
}

impl LifecycleConfig {
    /// Builds a config with an explicit retention window in milliseconds.
    pub fn with_retention_ms(retention_window_ms: i64) -> Result<Self, ConfigError> {
        if retention_window_ms <= 0 {
            return Err(ConfigError::NonPositiveRetention(retention_window_ms));
        }
        Ok(Self {
            retention_window_ms,
        })
    }

    pub fn with_retention_days(days: i64) -> Result<Self, ConfigError> {
        Self::with_retention_ms(days.saturating_mul(MS_PER_DAY))
    }

    pub fn retention_window_ms(&self) -> i64 {
        self.retention_window_ms
    }
}

/// Parses a retention window such as `30d` into milliseconds.
pub fn parse_retention_window(value: &str) -> Result<i64, ConfigError> {
    let caps = DURATION_RE
        .captures(value)
        .ok_or_else(|| ConfigError::InvalidDuration(value.to_string()))?;
    let amount: i64 = caps[1]
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(value.to_string()))?;
    let unit = match &caps[2] {
        "d" => MS_PER_DAY,
        "h" => MS_PER_HOUR,
        "m" => MS_PER_MINUTE,
        _ => MS_PER_SECOND,
    };
    let window = amount.saturating_mul(unit);
    if window <= 0 {
        return Err(ConfigError::NonPositiveRetention(window));
    }
    Ok(window)
}
