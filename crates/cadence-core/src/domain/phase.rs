use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Studying,
    ShortBreakActive,
    Paused,
    LongBreakActive,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Studying => "studying",
            Phase::ShortBreakActive => "short_break",
            Phase::Paused => "paused",
            Phase::LongBreakActive => "long_break",
        }
    }

    /// A study segment is open: its time has not been recorded yet.
    pub fn has_open_segment(&self) -> bool {
        matches!(
            self,
            Phase::Studying | Phase::Paused | Phase::ShortBreakActive
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
    }

    #[test]
    fn open_segment_covers_counting_and_suspended_phases() {
        assert!(Phase::Studying.has_open_segment());
        assert!(Phase::Paused.has_open_segment());
        assert!(Phase::ShortBreakActive.has_open_segment());
        assert!(!Phase::Idle.has_open_segment());
        assert!(!Phase::LongBreakActive.has_open_segment());
    }
}
