use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use super::session_record::SessionRecord;
use super::settings::{lenient, StudySettings};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Everything the study log file holds: running totals, the per-day log and
/// the operator's study settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningLedger {
    #[serde(deserialize_with = "lenient")]
    pub total_seconds: f64,
    #[serde(deserialize_with = "lenient")]
    pub total_cycles: f64,
    #[serde(deserialize_with = "lenient")]
    pub daily_log: BTreeMap<String, DayEntry>,
    #[serde(flatten)]
    pub settings: StudySettings,
}

impl Default for LearningLedger {
    fn default() -> Self {
        Self {
            total_seconds: 0.0,
            total_cycles: 0.0,
            daily_log: BTreeMap::new(),
            settings: StudySettings::default(),
        }
    }
}

impl LearningLedger {
    /// Adds `record` under `day` and folds it into the running totals.
    pub fn append(&mut self, day: NaiveDate, record: SessionRecord) {
        self.total_seconds += record.weighted_seconds();
        self.total_cycles += record.cycle_fraction;

        let key = day.format(DATE_KEY_FORMAT).to_string();
        let entry = self
            .daily_log
            .remove(&key)
            .unwrap_or_else(|| DayEntry::Sessions(Vec::new()));
        self.daily_log.insert(key, entry.with_record(record));
    }

    /// Drops the log and totals; settings survive.
    pub fn clear(&mut self) {
        self.total_seconds = 0.0;
        self.total_cycles = 0.0;
        self.daily_log.clear();
    }

    pub fn session_count(&self) -> usize {
        self.daily_log
            .values()
            .map(|entry| entry.records().count())
            .sum()
    }
}

/// One day of the log. Older files stored a bare per-day aggregate instead of
/// the session list; both shapes are kept exactly as found. Appending to an
/// aggregate day turns it into a list that starts with the untouched aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DayEntry {
    Sessions(Vec<SessionEntry>),
    Aggregate(LegacyAggregate),
    Unrecognized(Value),
}

impl DayEntry {
    pub fn records(&self) -> impl Iterator<Item = &SessionRecord> {
        let entries: &[SessionEntry] = match self {
            DayEntry::Sessions(entries) => entries,
            _ => &[],
        };
        entries.iter().filter_map(SessionEntry::record)
    }

    /// Legacy day totals held by this entry, whether the whole day or the
    /// leading item of a list.
    pub fn legacy_aggregates(&self) -> impl Iterator<Item = &LegacyAggregate> {
        let (whole, entries): (Option<&LegacyAggregate>, &[SessionEntry]) = match self {
            DayEntry::Sessions(entries) => (None, entries),
            DayEntry::Aggregate(aggregate) => (Some(aggregate), &[]),
            DayEntry::Unrecognized(_) => (None, &[]),
        };
        whole
            .into_iter()
            .chain(entries.iter().filter_map(SessionEntry::legacy))
    }

    fn with_record(self, record: SessionRecord) -> Self {
        match self {
            DayEntry::Sessions(mut entries) => {
                entries.push(SessionEntry::Record(record));
                DayEntry::Sessions(entries)
            }
            DayEntry::Aggregate(aggregate) => DayEntry::Sessions(vec![
                SessionEntry::Legacy(aggregate),
                SessionEntry::Record(record),
            ]),
            DayEntry::Unrecognized(raw) => DayEntry::Sessions(vec![
                SessionEntry::Malformed(raw),
                SessionEntry::Record(record),
            ]),
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => DayEntry::Sessions(
                items.into_iter().map(SessionEntry::from_value).collect(),
            ),
            Value::Object(fields) => DayEntry::Aggregate(LegacyAggregate { fields }),
            other => DayEntry::Unrecognized(other),
        }
    }
}

impl<'de> Deserialize<'de> for DayEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(DayEntry::from_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SessionEntry {
    Record(SessionRecord),
    Legacy(LegacyAggregate),
    Malformed(Value),
}

impl SessionEntry {
    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            SessionEntry::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn legacy(&self) -> Option<&LegacyAggregate> {
        match self {
            SessionEntry::Legacy(aggregate) => Some(aggregate),
            _ => None,
        }
    }

    fn from_value(value: Value) -> Self {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return SessionEntry::Malformed(other),
        };
        // Every record field has a default, so the aggregate shape is told
        // apart before the record parse can claim it.
        if fields.contains_key("seconds") && !fields.contains_key("duration_seconds") {
            return SessionEntry::Legacy(LegacyAggregate { fields });
        }
        let value = Value::Object(fields);
        match SessionRecord::deserialize(&value) {
            Ok(record) => SessionEntry::Record(record),
            Err(_) => SessionEntry::Malformed(value),
        }
    }
}

/// Day totals in the `{"seconds": .., "cycles": ..}` shape of older files.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct LegacyAggregate {
    fields: Map<String, Value>,
}

impl LegacyAggregate {
    pub fn new(seconds: f64, cycles: f64) -> Self {
        let mut aggregate = Self::default();
        aggregate.set("seconds", seconds);
        aggregate.set("cycles", cycles);
        aggregate
    }

    pub fn seconds(&self) -> f64 {
        self.number("seconds")
    }

    pub fn cycles(&self) -> f64 {
        self.number("cycles")
    }

    fn number(&self, key: &str) -> f64 {
        self.fields
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    fn set(&mut self, key: &str, value: f64) {
        let number = if value.fract() == 0.0 && value >= 0.0 && value <= u64::MAX as f64 {
            Number::from(value as u64)
        } else {
            Number::from_f64(value).unwrap_or_else(|| Number::from(0))
        };
        self.fields.insert(key.to_string(), Value::Number(number));
    }
}
