mod cycle;
mod ledger;
mod phase;
mod report;
mod session_record;
mod settings;

pub use cycle::{
    BreakInterval, CycleConfigError, IntervalRange, StudyCycleConfig, UnknownBreakIntervalError,
    DEFAULT_CYCLE_MINUTES, DEFAULT_PAUSE_DURATION, LONG_BREAK_DURATION, MAX_CYCLE_MINUTES,
    MIN_CYCLE_MINUTES, SHORT_BREAK_DURATION,
};
pub use ledger::{DayEntry, LearningLedger, LegacyAggregate, SessionEntry, DATE_KEY_FORMAT};
pub use phase::Phase;
pub use report::{aggregate, Period, PeriodTotals, UnknownPeriodError};
pub use session_record::{SessionRecord, TIME_OF_DAY_FORMAT};
pub use settings::{SettingsPatch, StudySettings};
