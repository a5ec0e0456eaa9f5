use serde::{Deserialize, Deserializer, Serialize};

use super::cycle::{
    BreakInterval, CycleConfigError, StudyCycleConfig, DEFAULT_CYCLE_MINUTES, MAX_CYCLE_MINUTES,
    MIN_CYCLE_MINUTES,
};

/// Operator preferences stored alongside the study log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudySettings {
    #[serde(rename = "cycle_duration", deserialize_with = "lenient_minutes")]
    pub cycle_minutes: u64,
    #[serde(deserialize_with = "lenient")]
    pub break_interval: BreakInterval,
    #[serde(deserialize_with = "lenient_true")]
    pub auto_pause_media: bool,
    #[serde(deserialize_with = "lenient_true")]
    pub auto_resume_media: bool,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            cycle_minutes: DEFAULT_CYCLE_MINUTES,
            break_interval: BreakInterval::default(),
            auto_pause_media: true,
            auto_resume_media: true,
        }
    }
}

impl StudySettings {
    /// Cycle configuration for the next segment. Out of range stored minutes
    /// are clamped rather than rejected so a hand-edited file still starts.
    pub fn cycle_config(&self) -> StudyCycleConfig {
        let minutes = self.cycle_minutes.clamp(MIN_CYCLE_MINUTES, MAX_CYCLE_MINUTES);
        StudyCycleConfig::new(
            std::time::Duration::from_secs(minutes * 60),
            self.break_interval.range(),
        )
    }

    pub fn apply(&mut self, patch: &SettingsPatch) -> Result<(), CycleConfigError> {
        if let Some(minutes) = patch.cycle_minutes {
            if !(MIN_CYCLE_MINUTES..=MAX_CYCLE_MINUTES).contains(&minutes) {
                return Err(CycleConfigError::InvalidCycleDuration { minutes });
            }
        }

        if let Some(minutes) = patch.cycle_minutes {
            self.cycle_minutes = minutes;
        }
        if let Some(interval) = patch.break_interval {
            self.break_interval = interval;
        }
        if let Some(enabled) = patch.auto_pause_media {
            self.auto_pause_media = enabled;
        }
        if let Some(enabled) = patch.auto_resume_media {
            self.auto_resume_media = enabled;
        }
        Ok(())
    }
}

/// Partial settings update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub cycle_minutes: Option<u64>,
    pub break_interval: Option<BreakInterval>,
    pub auto_pause_media: Option<bool>,
    pub auto_resume_media: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.cycle_minutes.is_none()
            && self.break_interval.is_none()
            && self.auto_pause_media.is_none()
            && self.auto_resume_media.is_none()
    }
}

/// Falls back to the type's default when a stored value has the wrong shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Whole minutes, also from `90.0` or `"90"`; anything else is the default
/// cycle length.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let minutes = match &value {
        serde_json::Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|minutes| minutes.fract() == 0.0 && *minutes >= 0.0)
                .map(|minutes| minutes as u64)
        }),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(minutes.unwrap_or(DEFAULT_CYCLE_MINUTES))
}

fn lenient_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: StudySettings = serde_json::from_str(r#"{"cycle_duration": 45}"#).unwrap();

        assert_eq!(settings.cycle_minutes, 45);
        assert_eq!(settings.break_interval, BreakInterval::Minutes3To5);
        assert!(settings.auto_pause_media);
        assert!(settings.auto_resume_media);
    }

    #[test]
    fn wrongly_typed_fields_fall_back_instead_of_failing() {
        let settings: StudySettings = serde_json::from_str(
            r#"{"cycle_duration": "ninety", "break_interval": "1-2h", "auto_pause_media": false}"#,
        )
        .unwrap();

        assert_eq!(settings.cycle_minutes, DEFAULT_CYCLE_MINUTES);
        assert_eq!(settings.break_interval, BreakInterval::default());
        assert!(!settings.auto_pause_media);
    }

    #[test]
    fn malformed_cycle_duration_keeps_the_default_cycle() {
        for stored in [r#"null"#, r#"{"minutes": 45}"#, r#"-5"#, r#"12.5"#] {
            let settings: StudySettings =
                serde_json::from_str(&format!(r#"{{"cycle_duration": {}}}"#, stored)).unwrap();
            assert_eq!(settings.cycle_config().cycle_duration.as_secs(), 5400, "{stored}");
        }
    }

    #[test]
    fn integral_floats_and_numeric_strings_are_minutes() {
        for stored in [r#"45.0"#, r#""45""#, r#"" 45 ""#] {
            let settings: StudySettings =
                serde_json::from_str(&format!(r#"{{"cycle_duration": {}}}"#, stored)).unwrap();
            assert_eq!(settings.cycle_minutes, 45, "{stored}");
        }
    }

    #[test]
    fn cycle_config_clamps_stored_minutes() {
        let settings = StudySettings {
            cycle_minutes: 0,
            ..StudySettings::default()
        };
        assert_eq!(settings.cycle_config().cycle_duration.as_secs(), 60);

        let settings = StudySettings {
            cycle_minutes: 999,
            ..StudySettings::default()
        };
        assert_eq!(settings.cycle_config().cycle_duration.as_secs(), 180 * 60);
    }

    #[test]
    fn apply_patch_updates_only_given_fields() {
        let mut settings = StudySettings::default();
        let patch = SettingsPatch {
            cycle_minutes: Some(50),
            auto_resume_media: Some(false),
            ..SettingsPatch::default()
        };

        settings.apply(&patch).unwrap();

        assert_eq!(settings.cycle_minutes, 50);
        assert_eq!(settings.break_interval, BreakInterval::default());
        assert!(settings.auto_pause_media);
        assert!(!settings.auto_resume_media);
    }

    #[test]
    fn apply_patch_rejects_out_of_range_minutes_without_partial_update() {
        let mut settings = StudySettings::default();
        let patch = SettingsPatch {
            cycle_minutes: Some(500),
            auto_pause_media: Some(false),
            ..SettingsPatch::default()
        };

        assert!(settings.apply(&patch).is_err());
        assert_eq!(settings, StudySettings::default());
    }
}
