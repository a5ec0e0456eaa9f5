use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// One finished study segment. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRecord")]
pub struct SessionRecord {
    pub start_time: String,
    pub end_time: String,
    pub duration_seconds: u64,
    pub completed_cycle: bool,
    pub cycle_fraction: f64,
}

impl SessionRecord {
    /// Builds the record of a segment that accrued `studied` out of a
    /// `cycle_duration` cycle.
    pub fn close(
        started_at: DateTime<Local>,
        ended_at: DateTime<Local>,
        studied: Duration,
        cycle_duration: Duration,
        completed_cycle: bool,
    ) -> Self {
        let studied = studied.min(cycle_duration);
        let duration_seconds = studied.as_secs();
        let cycle_fraction = if completed_cycle {
            1.0
        } else if cycle_duration.is_zero() {
            0.0
        } else {
            (duration_seconds as f64 / cycle_duration.as_secs_f64()).clamp(0.0, 1.0)
        };

        Self {
            start_time: started_at.format(TIME_OF_DAY_FORMAT).to_string(),
            end_time: ended_at.format(TIME_OF_DAY_FORMAT).to_string(),
            duration_seconds,
            completed_cycle,
            cycle_fraction,
        }
    }

    /// Contribution of this record to the ledger's `total_seconds`.
    pub fn weighted_seconds(&self) -> f64 {
        self.duration_seconds as f64 * self.cycle_fraction
    }

    pub fn start_time_of_day(&self) -> String {
        time_of_day(&self.start_time)
    }

    pub fn end_time_of_day(&self) -> String {
        time_of_day(&self.end_time)
    }
}

/// Older files stored full ISO timestamps; show those as a time of day too.
fn time_of_day(stored: &str) -> String {
    NaiveDateTime::parse_from_str(stored, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|timestamp| timestamp.format(TIME_OF_DAY_FORMAT).to_string())
        .unwrap_or_else(|_| stored.to_string())
}

#[derive(Deserialize)]
struct StoredRecord {
    #[serde(default = "not_available")]
    start_time: String,
    #[serde(default = "not_available")]
    end_time: String,
    #[serde(default)]
    duration_seconds: u64,
    #[serde(default, alias = "completed")]
    completed_cycle: bool,
    cycle_fraction: Option<f64>,
}

fn not_available() -> String {
    "N/A".to_string()
}

impl From<StoredRecord> for SessionRecord {
    fn from(stored: StoredRecord) -> Self {
        let fallback = if stored.completed_cycle { 1.0 } else { 0.0 };
        Self {
            start_time: stored.start_time,
            end_time: stored.end_time,
            duration_seconds: stored.duration_seconds,
            completed_cycle: stored.completed_cycle,
            cycle_fraction: stored.cycle_fraction.unwrap_or(fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 5, 2, hour, minute, second)
            .unwrap()
    }

    #[test]
    fn completed_cycle_has_full_fraction() {
        let record = SessionRecord::close(
            at(9, 0, 0),
            at(10, 30, 0),
            Duration::from_secs(5400),
            Duration::from_secs(5400),
            true,
        );

        assert_eq!(record.start_time, "09:00:00");
        assert_eq!(record.end_time, "10:30:00");
        assert_eq!(record.duration_seconds, 5400);
        assert!(record.completed_cycle);
        assert_eq!(record.cycle_fraction, 1.0);
        assert_eq!(record.weighted_seconds(), 5400.0);
    }

    #[test]
    fn interrupted_cycle_has_proportional_fraction() {
        let record = SessionRecord::close(
            at(9, 0, 0),
            at(9, 4, 10),
            Duration::from_millis(250_700),
            Duration::from_secs(600),
            false,
        );

        assert_eq!(record.duration_seconds, 250);
        assert!(!record.completed_cycle);
        assert!((record.cycle_fraction - 250.0 / 600.0).abs() < 1e-9);
    }

    #[test]
    fn studied_time_is_capped_at_cycle_length() {
        let record = SessionRecord::close(
            at(9, 0, 0),
            at(9, 20, 0),
            Duration::from_secs(700),
            Duration::from_secs(600),
            false,
        );

        assert_eq!(record.duration_seconds, 600);
        assert_eq!(record.cycle_fraction, 1.0);
    }

    #[test]
    fn legacy_record_without_fraction_uses_completion_flag() {
        let record: SessionRecord = serde_json::from_str(
            r#"{"start_time": "2024-01-03T08:00:00.123456", "duration_seconds": 5400, "completed": true}"#,
        )
        .unwrap();

        assert!(record.completed_cycle);
        assert_eq!(record.cycle_fraction, 1.0);
        assert_eq!(record.end_time, "N/A");
        assert_eq!(record.start_time_of_day(), "08:00:00");
    }

    #[test]
    fn record_serializes_with_snake_case_keys() {
        let record = SessionRecord::close(
            at(9, 0, 0),
            at(9, 10, 0),
            Duration::from_secs(600),
            Duration::from_secs(600),
            true,
        );

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["start_time"], "09:00:00");
        assert_eq!(json["duration_seconds"], 600);
        assert_eq!(json["completed_cycle"], true);
        assert_eq!(json["cycle_fraction"], 1.0);
    }
}
