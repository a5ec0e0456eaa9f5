use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use super::ledger::{DayEntry, LearningLedger, DATE_KEY_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Error, Debug)]
#[error("unknown period: {0}. Available: day, week, month, year")]
pub struct UnknownPeriodError(String);

impl Period {
    /// Bucket key of `date`: `2024-05-02`, ISO week `2024-W18`, `2024-05`, `2024`.
    pub fn bucket_key(&self, date: NaiveDate) -> String {
        match self {
            Period::Day => date.format(DATE_KEY_FORMAT).to_string(),
            Period::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Month => date.format("%Y-%m").to_string(),
            Period::Year => date.year().to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for Period {
    type Err = UnknownPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(Period::Day),
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            "year" | "yearly" => Ok(Period::Year),
            other => Err(UnknownPeriodError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub total_seconds: f64,
    pub total_cycles: f64,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub sessions: usize,
}

impl PeriodTotals {
    fn empty(day: NaiveDate) -> Self {
        Self {
            total_seconds: 0.0,
            total_cycles: 0.0,
            first_day: day,
            last_day: day,
            sessions: 0,
        }
    }
}

/// Folds the daily log into `period` buckets. Session lists contribute their
/// raw durations and cycle fractions; legacy day aggregates, whole days or
/// list items, contribute their stored totals. Days with an unparseable key or unrecognized content are
/// skipped.
pub fn aggregate(ledger: &LearningLedger, period: Period) -> BTreeMap<String, PeriodTotals> {
    let mut buckets: BTreeMap<String, PeriodTotals> = BTreeMap::new();

    for (key, entry) in &ledger.daily_log {
        let Ok(day) = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT) else {
            continue;
        };
        if matches!(entry, DayEntry::Unrecognized(_)) {
            continue;
        }

        let totals = buckets
            .entry(period.bucket_key(day))
            .or_insert_with(|| PeriodTotals::empty(day));
        totals.first_day = totals.first_day.min(day);
        totals.last_day = totals.last_day.max(day);

        for record in entry.records() {
            totals.total_seconds += record.duration_seconds as f64;
            totals.total_cycles += record.cycle_fraction;
            totals.sessions += 1;
        }
        for legacy in entry.legacy_aggregates() {
            totals.total_seconds += legacy.seconds();
            totals.total_cycles += legacy.cycles();
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LegacyAggregate, SessionRecord};

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, DATE_KEY_FORMAT).unwrap()
    }

    fn record(duration_seconds: u64, cycle_fraction: f64) -> SessionRecord {
        SessionRecord {
            start_time: "09:00:00".to_string(),
            end_time: "10:00:00".to_string(),
            duration_seconds,
            completed_cycle: cycle_fraction == 1.0,
            cycle_fraction,
        }
    }

    fn sample_ledger() -> LearningLedger {
        let mut ledger = LearningLedger::default();
        ledger.append(day("2023-12-31"), record(5400, 1.0));
        ledger.append(day("2024-01-01"), record(2700, 0.5));
        ledger.append(day("2024-01-01"), record(600, 1.0 / 9.0));
        ledger.append(day("2024-01-03"), record(900, 1.0 / 6.0));
        ledger.append(day("2024-01-08"), record(5400, 1.0));
        ledger.append(day("2024-02-14"), record(1800, 1.0 / 3.0));
        ledger.daily_log.insert(
            "2023-11-20".to_string(),
            DayEntry::Aggregate(LegacyAggregate::new(3600.0, 0.5)),
        );
        ledger
            .daily_log
            .insert("not-a-date".to_string(), DayEntry::Aggregate(LegacyAggregate::new(99.0, 9.0)));
        ledger
    }

    fn sum_seconds(buckets: &BTreeMap<String, PeriodTotals>) -> f64 {
        buckets.values().map(|totals| totals.total_seconds).sum()
    }

    #[test]
    fn bucket_keys_follow_period_format() {
        let date = day("2024-05-02");
        assert_eq!(Period::Day.bucket_key(date), "2024-05-02");
        assert_eq!(Period::Week.bucket_key(date), "2024-W18");
        assert_eq!(Period::Month.bucket_key(date), "2024-05");
        assert_eq!(Period::Year.bucket_key(date), "2024");
    }

    #[test]
    fn week_buckets_use_iso_week_year() {
        assert_eq!(Period::Week.bucket_key(day("2024-12-30")), "2025-W01");
        assert_eq!(Period::Week.bucket_key(day("2021-01-03")), "2020-W53");
    }

    #[test]
    fn daily_buckets_fold_sessions_and_legacy_entries() {
        let buckets = aggregate(&sample_ledger(), Period::Day);

        assert_eq!(buckets.len(), 6);
        let new_year = &buckets["2024-01-01"];
        assert_eq!(new_year.total_seconds, 3300.0);
        assert!((new_year.total_cycles - (0.5 + 1.0 / 9.0)).abs() < 1e-9);
        assert_eq!(new_year.sessions, 2);

        let legacy = &buckets["2023-11-20"];
        assert_eq!(legacy.total_seconds, 3600.0);
        assert_eq!(legacy.total_cycles, 0.5);
        assert_eq!(legacy.sessions, 0);
    }

    #[test]
    fn weekly_buckets_track_day_range() {
        let buckets = aggregate(&sample_ledger(), Period::Week);

        let first_week = &buckets["2024-W01"];
        assert_eq!(first_week.first_day, day("2024-01-01"));
        assert_eq!(first_week.last_day, day("2024-01-03"));
        assert_eq!(first_week.total_seconds, 3300.0 + 900.0);
        assert_eq!(first_week.sessions, 3);

        let new_years_eve = &buckets["2023-W52"];
        assert_eq!(new_years_eve.first_day, day("2023-12-31"));
        assert_eq!(new_years_eve.total_seconds, 5400.0);
    }

    #[test]
    fn yearly_and_monthly_buckets() {
        let ledger = sample_ledger();

        let years = aggregate(&ledger, Period::Year);
        assert_eq!(years["2023"].total_seconds, 5400.0 + 3600.0);
        assert_eq!(years["2024"].total_seconds, 3300.0 + 900.0 + 5400.0 + 1800.0);

        let months = aggregate(&ledger, Period::Month);
        assert_eq!(months.len(), 4);
        assert_eq!(months["2024-01"].sessions, 4);
    }

    #[test]
    fn aggregation_is_idempotent_and_consistent_across_periods() {
        let ledger = sample_ledger();
        let before = ledger.clone();

        let first = aggregate(&ledger, Period::Day);
        let second = aggregate(&ledger, Period::Day);
        assert_eq!(first, second);
        assert_eq!(ledger, before);

        let days = sum_seconds(&first);
        for period in [Period::Week, Period::Month, Period::Year] {
            let total = sum_seconds(&aggregate(&ledger, period));
            assert!((days - total).abs() < 1e-6, "{period}");
        }
    }

    #[test]
    fn legacy_day_with_appended_sessions_counts_both() {
        let mut ledger = LearningLedger::default();
        ledger.daily_log.insert(
            "2023-11-20".to_string(),
            DayEntry::Aggregate(LegacyAggregate::new(3600.0, 0.5)),
        );
        ledger.append(day("2023-11-20"), record(1800, 1.0 / 3.0));

        let totals = &aggregate(&ledger, Period::Day)["2023-11-20"];

        assert_eq!(totals.total_seconds, 5400.0);
        assert!((totals.total_cycles - (0.5 + 1.0 / 3.0)).abs() < 1e-9);
        assert_eq!(totals.sessions, 1);
    }

    #[test]
    fn unrecognized_days_are_skipped() {
        let mut ledger = LearningLedger::default();
        ledger
            .daily_log
            .insert("2024-05-02".to_string(), DayEntry::Unrecognized(serde_json::json!(42)));

        assert!(aggregate(&ledger, Period::Day).is_empty());
    }

    #[test]
    fn period_parses_case_insensitively() {
        assert_eq!("WEEK".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("daily".parse::<Period>().unwrap(), Period::Day);
        assert!("decade".parse::<Period>().is_err());
    }
}
