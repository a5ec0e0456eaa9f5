use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::break_scheduler::BreakScheduler;
use super::session_recorder::{RecorderError, SessionRecorder};
use super::timers::{TimerId, TimerQueue};
use crate::clock::{deadline_after, elapsed_between, Clock};
use crate::domain::{
    CycleConfigError, Period, PeriodTotals, Phase, SessionRecord, SettingsPatch,
    StudyCycleConfig, StudySettings, DEFAULT_PAUSE_DURATION,
};
use crate::ports::{
    BreakPresenter, MediaController, NotificationSound, PlaybackState, PopupKind, PopupRequest,
    PopupToken,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {operation} while {phase}")]
pub struct InvalidTransition {
    pub operation: &'static str,
    pub phase: Phase,
}

/// What happened during an engine call, for the layers that notify the
/// operator. Collected with [`TimerEngine::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PhaseChanged { from: Phase, to: Phase },
    SessionRecorded(SessionRecord),
    PersistenceFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupStatus {
    pub token: PopupToken,
    pub kind: PopupKind,
    pub remaining_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub studied_seconds: u64,
    pub cycle_seconds: u64,
    pub next_break_in_seconds: Option<u64>,
    pub pause_resumes_in_seconds: Option<u64>,
    pub popup: Option<PopupStatus>,
    pub long_break_elapsed_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineTimer {
    ShortBreak,
    PauseDeadline,
}

#[derive(Debug, Clone, Copy)]
struct OpenPopup {
    token: PopupToken,
    kind: PopupKind,
    shown_at: DateTime<Local>,
    duration: Duration,
}

struct TimerState {
    phase: Phase,
    config: StudyCycleConfig,
    cycle_started_at: Option<DateTime<Local>>,
    /// Start of the stretch currently being counted; `None` while the
    /// countdown is suspended.
    reference: Option<DateTime<Local>>,
    elapsed_before_pause: Duration,
    short_break: Option<TimerId>,
    pause_deadline: Option<TimerId>,
    break_missed_while_paused: bool,
    popup: Option<OpenPopup>,
    long_break_started_at: Option<DateTime<Local>>,
    media_paused_by_engine: bool,
}

impl TimerState {
    fn idle(config: StudyCycleConfig) -> Self {
        Self {
            phase: Phase::Idle,
            config,
            cycle_started_at: None,
            reference: None,
            elapsed_before_pause: Duration::ZERO,
            short_break: None,
            pause_deadline: None,
            break_missed_while_paused: false,
            popup: None,
            long_break_started_at: None,
            media_paused_by_engine: false,
        }
    }
}

/// The study cycle state machine.
///
/// Every method runs to completion on the caller's thread; the owner feeds it
/// `tick` on a short interval plus operator commands and presenter
/// completions, all from one task.
pub struct TimerEngine {
    clock: Arc<dyn Clock>,
    recorder: SessionRecorder,
    scheduler: BreakScheduler,
    presenter: Arc<dyn BreakPresenter>,
    sound: Arc<dyn NotificationSound>,
    media: Option<Arc<dyn MediaController>>,
    pause_auto_resume: Option<Duration>,
    state: TimerState,
    timers: TimerQueue<EngineTimer>,
    events: Vec<EngineEvent>,
    popups_shown: u64,
}

impl TimerEngine {
    pub fn new(
        clock: Arc<dyn Clock>,
        recorder: SessionRecorder,
        presenter: Arc<dyn BreakPresenter>,
        sound: Arc<dyn NotificationSound>,
    ) -> Self {
        Self {
            clock,
            recorder,
            scheduler: BreakScheduler::new(),
            presenter,
            sound,
            media: None,
            pause_auto_resume: Some(DEFAULT_PAUSE_DURATION),
            state: TimerState::idle(StudyCycleConfig::default()),
            timers: TimerQueue::new(),
            events: Vec::new(),
            popups_shown: 0,
        }
    }

    pub fn with_media(mut self, media: Arc<dyn MediaController>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_scheduler(mut self, scheduler: BreakScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// `None` keeps a pause open until the operator resumes.
    pub fn with_pause_auto_resume(mut self, pause: Option<Duration>) -> Self {
        self.pause_auto_resume = pause;
        self
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn settings(&self) -> &StudySettings {
        self.recorder.settings()
    }

    /// Configuration for the next segment from the stored settings, with an
    /// optional one-off cycle length.
    pub fn cycle_config(
        &self,
        cycle_minutes: Option<u64>,
    ) -> Result<StudyCycleConfig, CycleConfigError> {
        let settings = self.recorder.settings();
        let config = match cycle_minutes {
            Some(minutes) => StudyCycleConfig::from_minutes(minutes, settings.break_interval)?,
            None => settings.cycle_config(),
        };
        Ok(config.with_pause_auto_resume(self.pause_auto_resume))
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn start(&mut self, config: StudyCycleConfig) -> Result<(), InvalidTransition> {
        if self.state.phase != Phase::Idle {
            return Err(self.invalid("start a session"));
        }

        let now = self.clock.now();
        info!(
            cycle_seconds = config.cycle_duration.as_secs(),
            interval_min = config.short_break_interval.min(),
            interval_max = config.short_break_interval.max(),
            "study session started"
        );

        self.timers.cancel_all();
        let mut state = TimerState::idle(config);
        state.cycle_started_at = Some(now);
        state.reference = Some(now);
        self.state = state;

        self.set_phase(Phase::Studying);
        self.arm_short_break(now);
        Ok(())
    }

    /// Fires due timers, then recomputes the countdown from the clock.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        for (id, timer) in self.timers.pop_due(now) {
            match timer {
                EngineTimer::ShortBreak => self.on_short_break_due(id, now),
                EngineTimer::PauseDeadline => self.on_pause_deadline(id, now),
            }
        }

        if self.state.phase == Phase::Studying && self.remaining_at(now).is_zero() {
            self.complete_cycle(now);
        }
    }

    /// Pauses a running segment; on a paused one it resumes instead.
    pub fn pause(&mut self) -> Result<(), InvalidTransition> {
        match self.state.phase {
            Phase::Studying => {}
            Phase::Paused => return self.resume(),
            _ => return Err(self.invalid("pause")),
        }

        let now = self.clock.now();
        self.suspend_countdown(now);
        self.set_phase(Phase::Paused);

        if let Some(limit) = self.state.config.pause_auto_resume {
            let id = self
                .timers
                .schedule(deadline_after(now, limit), EngineTimer::PauseDeadline);
            self.state.pause_deadline = Some(id);
        }

        info!(
            remaining_seconds = self.remaining_at(now).as_secs(),
            auto_resume_seconds = self.state.config.pause_auto_resume.map(|d| d.as_secs()),
            "session paused"
        );
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), InvalidTransition> {
        if self.state.phase != Phase::Paused {
            return Err(self.invalid("resume"));
        }

        let now = self.clock.now();
        self.resume_at(now);
        Ok(())
    }

    /// Ends the open segment and records it as interrupted. During the long
    /// break it only ends the break, the cycle is already recorded.
    pub fn stop(&mut self) -> Result<(), InvalidTransition> {
        match self.state.phase {
            Phase::Idle => Err(self.invalid("stop")),
            Phase::LongBreakActive => {
                self.withdraw_popup();
                self.finish_long_break();
                Ok(())
            }
            Phase::Studying | Phase::Paused | Phase::ShortBreakActive => {
                let now = self.clock.now();
                self.suspend_countdown(now);
                self.cancel_timers();
                self.withdraw_popup();
                self.close_segment(now, false);
                self.state.media_paused_by_engine = false;
                self.set_phase(Phase::Idle);
                Ok(())
            }
        }
    }

    pub fn end_long_break(&mut self) -> Result<(), InvalidTransition> {
        if self.state.phase != Phase::LongBreakActive {
            return Err(self.invalid("end the long break"));
        }

        self.withdraw_popup();
        self.finish_long_break();
        Ok(())
    }

    /// Presenter completion for `token`. Returns `false` for a stale or
    /// repeated completion, which changes nothing.
    pub fn complete_popup(&mut self, token: PopupToken) -> bool {
        let Some(popup) = self.state.popup.filter(|popup| popup.token == token) else {
            debug!(%token, "stale popup completion dropped");
            return false;
        };
        self.state.popup = None;

        match popup.kind {
            PopupKind::ShortBreak => {
                let now = self.clock.now();
                self.finish_short_break(now);
            }
            PopupKind::LongBreak => self.finish_long_break(),
        }
        true
    }

    /// Operator dismissal of the open break popup.
    pub fn dismiss_popup(&mut self) -> Result<(), InvalidTransition> {
        let Some(popup) = self.state.popup else {
            return Err(self.invalid("dismiss a break"));
        };

        self.presenter.dismiss(popup.token);
        self.complete_popup(popup.token);
        Ok(())
    }

    /// Stores new settings. Cycle length and break interval apply from the
    /// next `start`; media toggles apply immediately.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<StudySettings, RecorderError> {
        self.recorder.update_settings(patch)
    }

    pub fn clear_history(&mut self) -> Result<(), RecorderError> {
        self.recorder.clear()
    }

    pub fn aggregate(&self, period: Period) -> BTreeMap<String, PeriodTotals> {
        self.recorder.aggregate(period)
    }

    pub fn remaining(&self) -> Duration {
        if self.state.phase.has_open_segment() {
            self.remaining_at(self.clock.now())
        } else {
            Duration::ZERO
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        let now = self.clock.now();
        let state = &self.state;
        let cycle = match state.phase {
            Phase::Idle => self.recorder.settings().cycle_config().cycle_duration,
            _ => state.config.cycle_duration,
        };
        let studied = match state.phase {
            Phase::Idle => Duration::ZERO,
            Phase::LongBreakActive => cycle,
            _ => self.counted(now).min(cycle),
        };
        let until = |id: Option<TimerId>| {
            id.and_then(|id| self.timers.due_at(id))
                .map(|due| whole_seconds_up(elapsed_between(now, due)))
        };

        StatusSnapshot {
            phase: state.phase,
            remaining_seconds: whole_seconds_up(self.remaining()),
            studied_seconds: studied.as_secs(),
            cycle_seconds: cycle.as_secs(),
            next_break_in_seconds: match state.phase {
                Phase::Studying => until(state.short_break),
                _ => None,
            },
            pause_resumes_in_seconds: until(state.pause_deadline),
            popup: state.popup.map(|popup| PopupStatus {
                token: popup.token,
                kind: popup.kind,
                remaining_seconds: whole_seconds_up(
                    popup
                        .duration
                        .saturating_sub(elapsed_between(popup.shown_at, now)),
                ),
            }),
            long_break_elapsed_seconds: state
                .long_break_started_at
                .map(|started| elapsed_between(started, now).as_secs()),
        }
    }

    fn invalid(&self, operation: &'static str) -> InvalidTransition {
        debug!(operation, phase = %self.state.phase, "transition ignored");
        InvalidTransition {
            operation,
            phase: self.state.phase,
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        self.state.phase = to;
        info!(%from, %to, "phase changed");
        self.events.push(EngineEvent::PhaseChanged { from, to });
    }

    fn counted(&self, now: DateTime<Local>) -> Duration {
        let stretch = self
            .state
            .reference
            .map(|reference| elapsed_between(reference, now))
            .unwrap_or_default();
        self.state.elapsed_before_pause.saturating_add(stretch)
    }

    fn remaining_at(&self, now: DateTime<Local>) -> Duration {
        self.state
            .config
            .cycle_duration
            .saturating_sub(self.counted(now))
    }

    fn suspend_countdown(&mut self, now: DateTime<Local>) {
        let counted = self.counted(now).min(self.state.config.cycle_duration);
        self.state.elapsed_before_pause = counted;
        self.state.reference = None;
    }

    fn resume_at(&mut self, now: DateTime<Local>) {
        if let Some(id) = self.state.pause_deadline.take() {
            self.timers.cancel(id);
        }
        self.state.reference = Some(now);
        self.set_phase(Phase::Studying);
        info!(
            remaining_seconds = self.remaining_at(now).as_secs(),
            "session resumed"
        );

        if std::mem::take(&mut self.state.break_missed_while_paused) {
            self.arm_short_break(now);
        }
    }

    fn arm_short_break(&mut self, now: DateTime<Local>) {
        if let Some(id) = self.state.short_break.take() {
            self.timers.cancel(id);
        }

        let remaining = self.remaining_at(now);
        let delay = self.scheduler.arm_next(
            remaining,
            self.state.config.short_break_interval,
            self.state.config.short_break_duration,
        );

        match delay {
            Some(delay) => {
                let id = self
                    .timers
                    .schedule(deadline_after(now, delay), EngineTimer::ShortBreak);
                self.state.short_break = Some(id);
                debug!(delay_seconds = delay.as_secs(), "short break armed");
            }
            None => {
                debug!(
                    remaining_seconds = remaining.as_secs(),
                    "no room for another short break in this segment"
                );
            }
        }
    }

    fn cancel_timers(&mut self) {
        self.timers.cancel_all();
        self.state.short_break = None;
        self.state.pause_deadline = None;
        self.state.break_missed_while_paused = false;
    }

    fn on_short_break_due(&mut self, id: TimerId, now: DateTime<Local>) {
        if self.state.short_break != Some(id) {
            debug!("stale short break timer dropped");
            return;
        }
        self.state.short_break = None;

        match self.state.phase {
            Phase::Studying => {}
            Phase::Paused => {
                debug!("short break due while paused, re-arming on resume");
                self.state.break_missed_while_paused = true;
                return;
            }
            phase => {
                debug!(%phase, "short break due outside studying, ignored");
                return;
            }
        }

        let remaining = self.remaining_at(now);
        if remaining.is_zero() {
            return;
        }

        info!(remaining_seconds = remaining.as_secs(), "short break");
        self.sound.play_notification();
        self.pause_media();
        self.suspend_countdown(now);
        self.set_phase(Phase::ShortBreakActive);
        let duration = self.state.config.short_break_duration;
        self.show_popup(PopupKind::ShortBreak, duration, now);
    }

    fn on_pause_deadline(&mut self, id: TimerId, now: DateTime<Local>) {
        if self.state.pause_deadline != Some(id) || self.state.phase != Phase::Paused {
            debug!("stale pause deadline dropped");
            return;
        }
        self.state.pause_deadline = None;

        info!("pause expired, resuming");
        self.resume_at(now);
    }

    fn finish_short_break(&mut self, now: DateTime<Local>) {
        info!("short break over");
        self.sound.play_notification();
        self.resume_media();
        self.state.reference = Some(now);
        self.set_phase(Phase::Studying);
        self.arm_short_break(now);
    }

    fn complete_cycle(&mut self, now: DateTime<Local>) {
        self.cancel_timers();
        self.state.elapsed_before_pause = self.state.config.cycle_duration;
        self.state.reference = None;
        self.close_segment(now, true);

        info!("study cycle complete, long break");
        self.pause_media();
        self.sound.play_notification();
        self.state.long_break_started_at = Some(now);
        self.set_phase(Phase::LongBreakActive);
        let duration = self.state.config.long_break_duration;
        self.show_popup(PopupKind::LongBreak, duration, now);
    }

    fn finish_long_break(&mut self) {
        self.state.long_break_started_at = None;
        self.state.media_paused_by_engine = false;
        info!("long break over");
        self.set_phase(Phase::Idle);
    }

    fn close_segment(&mut self, now: DateTime<Local>, completed_cycle: bool) {
        let started_at = self.state.cycle_started_at.unwrap_or(now);
        let record = SessionRecord::close(
            started_at,
            now,
            self.state.elapsed_before_pause,
            self.state.config.cycle_duration,
            completed_cycle,
        );

        info!(
            duration_seconds = record.duration_seconds,
            completed_cycle,
            cycle_fraction = record.cycle_fraction,
            "session closed"
        );

        let result = self.recorder.record(now.date_naive(), record.clone());
        self.events.push(EngineEvent::SessionRecorded(record));
        if let Err(error) = result {
            self.events.push(EngineEvent::PersistenceFailed {
                message: error.to_string(),
            });
        }
    }

    fn show_popup(&mut self, kind: PopupKind, duration: Duration, now: DateTime<Local>) {
        self.popups_shown += 1;
        let token = PopupToken::new(self.popups_shown);
        self.state.popup = Some(OpenPopup {
            token,
            kind,
            shown_at: now,
            duration,
        });
        self.presenter.show_countdown(PopupRequest {
            token,
            kind,
            duration,
        });
    }

    fn withdraw_popup(&mut self) {
        if let Some(popup) = self.state.popup.take() {
            self.presenter.dismiss(popup.token);
        }
    }

    fn pause_media(&mut self) {
        if !self.recorder.settings().auto_pause_media {
            return;
        }
        let Some(media) = self.media.clone() else {
            return;
        };

        match media.playback_state() {
            Ok(PlaybackState::Playing) => {}
            Ok(state) => {
                debug!(%state, "media not playing, left alone");
                return;
            }
            Err(error) => {
                warn!(%error, "media state unavailable, not pausing");
                return;
            }
        }

        match media.toggle_playback() {
            Ok(outcome) => debug!(%outcome, "media toggled"),
            Err(error) => {
                warn!(%error, "failed to pause media");
                return;
            }
        }

        match media.playback_state() {
            Ok(PlaybackState::Paused) => self.state.media_paused_by_engine = true,
            Ok(state) => warn!(%state, "media still not paused after toggle"),
            Err(error) => warn!(%error, "media state unavailable after toggle"),
        }
    }

    fn resume_media(&mut self) {
        if !std::mem::take(&mut self.state.media_paused_by_engine) {
            return;
        }
        if !self.recorder.settings().auto_resume_media {
            debug!("media resume disabled, leaving it paused");
            return;
        }
        let Some(media) = self.media.clone() else {
            return;
        };

        match media.playback_state() {
            Ok(PlaybackState::Paused) => match media.toggle_playback() {
                Ok(outcome) => debug!(%outcome, "media resumed"),
                Err(error) => warn!(%error, "failed to resume media"),
            },
            Ok(state) => debug!(%state, "media changed during the break, not resuming"),
            Err(error) => warn!(%error, "media state unavailable, not resuming"),
        }
    }
}

fn whole_seconds_up(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
