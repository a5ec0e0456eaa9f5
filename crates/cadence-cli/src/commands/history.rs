use anyhow::{Context, Result};
use cadence_core::domain::DATE_KEY_FORMAT;
use cadence_core::{LearningLedger, Translator};
use chrono::{Local, NaiveDate};

use super::common::{format_duration, get_translator, load_ledger};

pub fn execute(date: Option<&str>) -> Result<()> {
    let translator = get_translator();
    let day = match date {
        Some(value) => NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
            .with_context(|| format!("invalid date {:?}, expected YYYY-MM-DD", value))?,
        None => Local::now().date_naive(),
    };

    let ledger = load_ledger(&translator)?;
    for line in describe_day(&ledger, day, &translator) {
        println!("{}", line);
    }

    Ok(())
}

fn describe_day(ledger: &LearningLedger, day: NaiveDate, translator: &Translator) -> Vec<String> {
    let key = day.format(DATE_KEY_FORMAT).to_string();
    let date = [("date", key.as_str())];

    let Some(entry) = ledger.daily_log.get(&key) else {
        return vec![translator.format("cli.history_empty", &date)];
    };

    let mut lines: Vec<String> = entry
        .legacy_aggregates()
        .map(|aggregate| {
            let minutes = format!("{:.0}", aggregate.seconds() / 60.0);
            translator.format(
                "cli.history_legacy",
                &[("date", key.as_str()), ("minutes", &minutes)],
            )
        })
        .collect();

    if entry.records().next().is_some() {
        lines.push(translator.format("cli.history_title", &date));
        lines.extend(entry.records().map(|record| {
            format!(
                "  {} - {}  {:>16}  {:>3.0}%",
                record.start_time_of_day(),
                record.end_time_of_day(),
                format_duration(record.duration_seconds),
                record.cycle_fraction * 100.0,
            )
        }));
    }

    if lines.is_empty() {
        lines.push(translator.format("cli.history_empty", &date));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::domain::{DayEntry, LegacyAggregate};
    use cadence_core::{Language, SessionRecord};

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, DATE_KEY_FORMAT).unwrap()
    }

    #[test]
    fn lists_each_session_of_the_day() {
        let mut ledger = LearningLedger::default();
        ledger.append(
            day("2024-05-02"),
            SessionRecord {
                start_time: "09:00:00".to_string(),
                end_time: "09:45:00".to_string(),
                duration_seconds: 2700,
                completed_cycle: false,
                cycle_fraction: 0.5,
            },
        );

        let lines = describe_day(&ledger, day("2024-05-02"), &Translator::new(Language::En));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Sessions on 2024-05-02");
        assert!(lines[1].contains("09:00:00 - 09:45:00"));
        assert!(lines[1].contains("45 min 0 sec"));
        assert!(lines[1].ends_with("50%"));
    }

    #[test]
    fn legacy_days_show_their_summary() {
        let mut ledger = LearningLedger::default();
        ledger.daily_log.insert(
            "2023-11-20".to_string(),
            DayEntry::Aggregate(LegacyAggregate::new(3600.0, 0.5)),
        );

        let lines = describe_day(&ledger, day("2023-11-20"), &Translator::new(Language::En));

        assert_eq!(lines, vec!["2023-11-20: 60 min total (summary only)".to_string()]);
    }

    #[test]
    fn legacy_summary_precedes_sessions_added_later() {
        let mut ledger = LearningLedger::default();
        ledger.daily_log.insert(
            "2023-11-20".to_string(),
            DayEntry::Aggregate(LegacyAggregate::new(3600.0, 0.5)),
        );
        ledger.append(
            day("2023-11-20"),
            SessionRecord {
                start_time: "20:00:00".to_string(),
                end_time: "20:30:00".to_string(),
                duration_seconds: 1800,
                completed_cycle: false,
                cycle_fraction: 1.0 / 3.0,
            },
        );

        let lines = describe_day(&ledger, day("2023-11-20"), &Translator::new(Language::En));

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2023-11-20: 60 min total (summary only)");
        assert_eq!(lines[1], "Sessions on 2023-11-20");
        assert!(lines[2].contains("20:00:00 - 20:30:00"));
    }

    #[test]
    fn missing_day_is_reported_empty() {
        let lines = describe_day(
            &LearningLedger::default(),
            day("2024-05-02"),
            &Translator::new(Language::En),
        );

        assert_eq!(lines, vec!["No sessions recorded on 2024-05-02.".to_string()]);
    }
}
