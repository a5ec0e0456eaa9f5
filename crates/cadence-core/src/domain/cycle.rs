use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CYCLE_MINUTES: u64 = 90;
pub const MIN_CYCLE_MINUTES: u64 = 1;
pub const MAX_CYCLE_MINUTES: u64 = 180;
pub const SHORT_BREAK_DURATION: Duration = Duration::from_secs(10);
pub const LONG_BREAK_DURATION: Duration = Duration::from_secs(20 * 60);
pub const DEFAULT_PAUSE_DURATION: Duration = Duration::from_secs(5 * 60);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleConfigError {
    #[error("invalid short break interval: min {min}s is greater than max {max}s")]
    InvalidInterval { min: u64, max: u64 },

    #[error("cycle duration must be between 1 and 180 minutes, got {minutes}")]
    InvalidCycleDuration { minutes: u64 },
}

/// Inclusive range of seconds the next short break is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalRange {
    min: u64,
    max: u64,
}

impl IntervalRange {
    pub fn new(min: u64, max: u64) -> Result<Self, CycleConfigError> {
        if min > max {
            return Err(CycleConfigError::InvalidInterval { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

#[derive(Debug, Error)]
#[error("unknown break interval: {0}. Available: 5-10s, 2-4min, 3-5min, 4-6min, 5-7min, 5-10min, 10-15min, 15-25min, 25-45min")]
pub struct UnknownBreakIntervalError(String);

/// Selectable short break spacing. The four original options keep their
/// localized labels in the data file; the English keys are read as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BreakInterval {
    #[serde(rename = "5-10s")]
    Seconds5To10,
    #[serde(rename = "2-4分钟", alias = "2-4min")]
    Minutes2To4,
    #[default]
    #[serde(rename = "3-5分钟", alias = "3-5min")]
    Minutes3To5,
    #[serde(rename = "4-6分钟", alias = "4-6min")]
    Minutes4To6,
    #[serde(rename = "5-7分钟", alias = "5-7min")]
    Minutes5To7,
    #[serde(rename = "5-10min")]
    Minutes5To10,
    #[serde(rename = "10-15min")]
    Minutes10To15,
    #[serde(rename = "15-25min")]
    Minutes15To25,
    #[serde(rename = "25-45min")]
    Minutes25To45,
}

impl BreakInterval {
    pub fn all() -> &'static [BreakInterval] {
        &[
            BreakInterval::Seconds5To10,
            BreakInterval::Minutes2To4,
            BreakInterval::Minutes3To5,
            BreakInterval::Minutes4To6,
            BreakInterval::Minutes5To7,
            BreakInterval::Minutes5To10,
            BreakInterval::Minutes10To15,
            BreakInterval::Minutes15To25,
            BreakInterval::Minutes25To45,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            BreakInterval::Seconds5To10 => "5-10s",
            BreakInterval::Minutes2To4 => "2-4min",
            BreakInterval::Minutes3To5 => "3-5min",
            BreakInterval::Minutes4To6 => "4-6min",
            BreakInterval::Minutes5To7 => "5-7min",
            BreakInterval::Minutes5To10 => "5-10min",
            BreakInterval::Minutes10To15 => "10-15min",
            BreakInterval::Minutes15To25 => "15-25min",
            BreakInterval::Minutes25To45 => "25-45min",
        }
    }

    pub fn range(&self) -> IntervalRange {
        let (min, max) = match self {
            BreakInterval::Seconds5To10 => (5, 10),
            BreakInterval::Minutes2To4 => (2 * 60, 4 * 60),
            BreakInterval::Minutes3To5 => (3 * 60, 5 * 60),
            BreakInterval::Minutes4To6 => (4 * 60, 6 * 60),
            BreakInterval::Minutes5To7 => (5 * 60, 7 * 60),
            BreakInterval::Minutes5To10 => (5 * 60, 10 * 60),
            BreakInterval::Minutes10To15 => (10 * 60, 15 * 60),
            BreakInterval::Minutes15To25 => (15 * 60, 25 * 60),
            BreakInterval::Minutes25To45 => (25 * 60, 45 * 60),
        };
        IntervalRange { min, max }
    }
}

impl fmt::Display for BreakInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for BreakInterval {
    type Err = UnknownBreakIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace("分钟", "min");
        BreakInterval::all()
            .iter()
            .copied()
            .find(|interval| interval.key() == normalized)
            .ok_or_else(|| UnknownBreakIntervalError(s.to_string()))
    }
}

/// Configuration frozen for the lifetime of one study segment.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyCycleConfig {
    pub cycle_duration: Duration,
    pub short_break_duration: Duration,
    pub long_break_duration: Duration,
    pub short_break_interval: IntervalRange,
    pub pause_auto_resume: Option<Duration>,
}

impl StudyCycleConfig {
    pub fn new(cycle_duration: Duration, short_break_interval: IntervalRange) -> Self {
        Self {
            cycle_duration,
            short_break_duration: SHORT_BREAK_DURATION,
            long_break_duration: LONG_BREAK_DURATION,
            short_break_interval,
            pause_auto_resume: Some(DEFAULT_PAUSE_DURATION),
        }
    }

    pub fn from_minutes(minutes: u64, interval: BreakInterval) -> Result<Self, CycleConfigError> {
        if !(MIN_CYCLE_MINUTES..=MAX_CYCLE_MINUTES).contains(&minutes) {
            return Err(CycleConfigError::InvalidCycleDuration { minutes });
        }
        Ok(Self::new(
            Duration::from_secs(minutes * 60),
            interval.range(),
        ))
    }

    pub fn with_pause_auto_resume(mut self, pause: Option<Duration>) -> Self {
        self.pause_auto_resume = pause;
        self
    }
}

impl Default for StudyCycleConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_CYCLE_MINUTES * 60),
            BreakInterval::default().range(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_range_rejects_inverted_bounds() {
        assert!(IntervalRange::new(300, 600).is_ok());
        assert!(IntervalRange::new(5, 5).is_ok());
        assert_eq!(
            IntervalRange::new(600, 300),
            Err(CycleConfigError::InvalidInterval { min: 600, max: 300 })
        );
    }

    #[test]
    fn every_break_interval_has_a_valid_range() {
        for interval in BreakInterval::all() {
            let range = interval.range();
            assert!(range.min() <= range.max(), "{interval}");
        }
    }

    #[test]
    fn break_interval_parses_keys_and_localized_labels() {
        assert_eq!(
            "3-5min".parse::<BreakInterval>().unwrap(),
            BreakInterval::Minutes3To5
        );
        assert_eq!(
            "3-5分钟".parse::<BreakInterval>().unwrap(),
            BreakInterval::Minutes3To5
        );
        assert_eq!(
            "5-10S".parse::<BreakInterval>().unwrap(),
            BreakInterval::Seconds5To10
        );
        assert!("1-2h".parse::<BreakInterval>().is_err());
    }

    #[test]
    fn localized_minute_options_keep_their_stored_label() {
        let interval: BreakInterval = serde_json::from_str("\"4-6分钟\"").unwrap();
        assert_eq!(interval, BreakInterval::Minutes4To6);
        assert_eq!(serde_json::to_string(&interval).unwrap(), "\"4-6分钟\"");

        let english: BreakInterval = serde_json::from_str("\"2-4min\"").unwrap();
        assert_eq!(english, BreakInterval::Minutes2To4);
        assert_eq!(serde_json::to_string(&english).unwrap(), "\"2-4分钟\"");
    }

    #[test]
    fn added_options_are_stored_by_key() {
        for interval in [BreakInterval::Minutes5To10, BreakInterval::Seconds5To10] {
            let written = serde_json::to_string(&interval).unwrap();
            assert_eq!(written, format!("\"{}\"", interval.key()));
        }
    }

    #[test]
    fn default_config_matches_ninety_minute_cycle() {
        let config = StudyCycleConfig::default();

        assert_eq!(config.cycle_duration, Duration::from_secs(5400));
        assert_eq!(config.short_break_duration, Duration::from_secs(10));
        assert_eq!(config.long_break_duration, Duration::from_secs(1200));
        assert_eq!(config.short_break_interval, IntervalRange::new(180, 300).unwrap());
        assert_eq!(config.pause_auto_resume, Some(Duration::from_secs(300)));
    }

    #[test]
    fn from_minutes_validates_bounds() {
        assert!(StudyCycleConfig::from_minutes(0, BreakInterval::default()).is_err());
        assert!(StudyCycleConfig::from_minutes(181, BreakInterval::default()).is_err());

        let config = StudyCycleConfig::from_minutes(45, BreakInterval::Minutes5To10).unwrap();
        assert_eq!(config.cycle_duration, Duration::from_secs(2700));
        assert_eq!(config.short_break_interval.max(), 600);
    }
}
