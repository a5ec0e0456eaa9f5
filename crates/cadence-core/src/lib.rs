//! Cadence core library
//!
//! Study cycle domain types, the timer engine and the port traits it drives.
//! This crate has no knowledge of sockets, desktop notifications or files.

pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod i18n;
pub mod ports;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigError, MediaConfig, NotificationConfig, NotificationUrgency, TimerConfig};
pub use domain::{
    aggregate, BreakInterval, LearningLedger, Period, PeriodTotals, Phase, SessionRecord,
    SettingsPatch, StudyCycleConfig, StudySettings,
};
pub use engine::{EngineEvent, InvalidTransition, PopupStatus, SessionRecorder, StatusSnapshot, TimerEngine};
pub use i18n::{Language, Translator};
pub use ports::{
    BreakPresenter, LedgerStore, LedgerStoreError, MediaControlError, MediaController,
    NotificationSound, PlaybackState, PopupKind, PopupRequest, PopupToken,
};
