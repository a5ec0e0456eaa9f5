use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use cadence_core::{
    EngineEvent, Phase, PopupKind, PopupToken, SettingsPatch, StatusSnapshot, StudySettings,
    TimerEngine, Translator,
};

use super::NotifierHandle;

/// Result of an operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Not valid in the current phase; nothing changed.
    Ignored(String),
    Failed(String),
}

pub enum TimerMessage {
    Start {
        cycle_minutes: Option<u64>,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Stop {
        reply: oneshot::Sender<CommandOutcome>,
    },
    Pause {
        reply: oneshot::Sender<CommandOutcome>,
    },
    Resume {
        reply: oneshot::Sender<CommandOutcome>,
    },
    DismissBreak {
        reply: oneshot::Sender<CommandOutcome>,
    },
    PopupFinished {
        token: PopupToken,
    },
    GetStatus {
        reply: oneshot::Sender<StatusSnapshot>,
    },
    GetSettings {
        reply: oneshot::Sender<StudySettings>,
    },
    UpdateSettings {
        patch: SettingsPatch,
        reply: oneshot::Sender<Result<StudySettings, String>>,
    },
    ClearHistory {
        reply: oneshot::Sender<CommandOutcome>,
    },
}

#[derive(Clone)]
pub struct TimerHandle {
    sender: mpsc::Sender<TimerMessage>,
}

impl TimerHandle {
    /// Handle plus the receiving end for [`TimerActor::new`]. Split so the
    /// break presenter can hold a handle before the engine exists.
    pub fn channel() -> (Self, mpsc::Receiver<TimerMessage>) {
        let (sender, receiver) = mpsc::channel(32);
        (Self { sender }, receiver)
    }

    pub async fn start(&self, cycle_minutes: Option<u64>) -> Option<CommandOutcome> {
        self.request(|reply| TimerMessage::Start {
            cycle_minutes,
            reply,
        })
        .await
    }

    pub async fn stop(&self) -> Option<CommandOutcome> {
        self.request(|reply| TimerMessage::Stop { reply }).await
    }

    pub async fn pause(&self) -> Option<CommandOutcome> {
        self.request(|reply| TimerMessage::Pause { reply }).await
    }

    pub async fn resume(&self) -> Option<CommandOutcome> {
        self.request(|reply| TimerMessage::Resume { reply }).await
    }

    pub async fn dismiss_break(&self) -> Option<CommandOutcome> {
        self.request(|reply| TimerMessage::DismissBreak { reply })
            .await
    }

    pub async fn popup_finished(
        &self,
        token: PopupToken,
    ) -> Result<(), mpsc::error::SendError<TimerMessage>> {
        self.sender.send(TimerMessage::PopupFinished { token }).await
    }

    pub async fn get_status(&self) -> Option<StatusSnapshot> {
        self.request(|reply| TimerMessage::GetStatus { reply }).await
    }

    pub async fn get_settings(&self) -> Option<StudySettings> {
        self.request(|reply| TimerMessage::GetSettings { reply })
            .await
    }

    pub async fn update_settings(
        &self,
        patch: SettingsPatch,
    ) -> Option<Result<StudySettings, String>> {
        self.request(|reply| TimerMessage::UpdateSettings { patch, reply })
            .await
    }

    pub async fn clear_history(&self) -> Option<CommandOutcome> {
        self.request(|reply| TimerMessage::ClearHistory { reply })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TimerMessage,
    ) -> Option<T> {
        let (reply_sender, reply_receiver) = oneshot::channel();
        self.sender.send(build(reply_sender)).await.ok()?;
        reply_receiver.await.ok()
    }
}

/// Owns the timer engine. Commands, popup completions and ticks are all
/// handled on this one task, so the engine never sees concurrent calls.
pub struct TimerActor {
    receiver: mpsc::Receiver<TimerMessage>,
    engine: TimerEngine,
    notifier: Option<NotifierHandle>,
    translator: Translator,
    tick_interval: Duration,
}

impl TimerActor {
    pub fn new(
        receiver: mpsc::Receiver<TimerMessage>,
        engine: TimerEngine,
        notifier: Option<NotifierHandle>,
        translator: Translator,
        tick_interval: Duration,
    ) -> Self {
        Self {
            receiver,
            engine,
            notifier,
            translator,
            tick_interval,
        }
    }

    pub async fn run(mut self) {
        let mut tick_interval = tokio::time::interval(self.tick_interval);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            tick_ms = self.tick_interval.as_millis() as u64,
            "timer actor started"
        );

        loop {
            tokio::select! {
                Some(message) = self.receiver.recv() => {
                    self.engine.tick();
                    self.handle(message);
                }
                _ = tick_interval.tick() => {
                    self.engine.tick();
                }
                else => break,
            }
            self.dispatch_events();
        }

        debug!("timer actor stopped");
    }

    fn handle(&mut self, message: TimerMessage) {
        match message {
            TimerMessage::Start {
                cycle_minutes,
                reply,
            } => {
                let outcome = match self.engine.cycle_config(cycle_minutes) {
                    Ok(config) => outcome(self.engine.start(config)),
                    Err(error) => CommandOutcome::Failed(error.to_string()),
                };
                let _ = reply.send(outcome);
            }
            TimerMessage::Stop { reply } => {
                let _ = reply.send(outcome(self.engine.stop()));
            }
            TimerMessage::Pause { reply } => {
                let _ = reply.send(outcome(self.engine.pause()));
            }
            TimerMessage::Resume { reply } => {
                let _ = reply.send(outcome(self.engine.resume()));
            }
            TimerMessage::DismissBreak { reply } => {
                let _ = reply.send(outcome(self.engine.dismiss_popup()));
            }
            TimerMessage::PopupFinished { token } => {
                if !self.engine.complete_popup(token) {
                    debug!(%token, "completion for closed popup ignored");
                }
            }
            TimerMessage::GetStatus { reply } => {
                let _ = reply.send(self.engine.status());
            }
            TimerMessage::GetSettings { reply } => {
                let _ = reply.send(self.engine.settings().clone());
            }
            TimerMessage::UpdateSettings { patch, reply } => {
                let result = self
                    .engine
                    .update_settings(&patch)
                    .map_err(|error| error.to_string());
                let _ = reply.send(result);
            }
            TimerMessage::ClearHistory { reply } => {
                let outcome = match self.engine.clear_history() {
                    Ok(()) => CommandOutcome::Applied,
                    Err(error) => CommandOutcome::Failed(error.to_string()),
                };
                let _ = reply.send(outcome);
            }
        }
    }

    fn dispatch_events(&mut self) {
        let events = self.engine.drain_events();
        let Some(ref notifier) = self.notifier else {
            return;
        };

        for event in events {
            match event {
                EngineEvent::PhaseChanged { from, to } => match (from, to) {
                    (Phase::Idle, Phase::Studying) => {
                        let cycle_minutes = self.engine.status().cycle_seconds / 60;
                        notifier.send_session_started(cycle_minutes);
                    }
                    (_, Phase::Paused) => notifier.send_session_paused(),
                    (Phase::Paused, Phase::Studying) => notifier.send_session_resumed(),
                    (Phase::ShortBreakActive, Phase::Studying) => {
                        notifier.send_break_over(PopupKind::ShortBreak)
                    }
                    (Phase::LongBreakActive, Phase::Idle) => {
                        notifier.send_break_over(PopupKind::LongBreak)
                    }
                    _ => {}
                },
                EngineEvent::SessionRecorded(record) => {
                    if !record.completed_cycle {
                        notifier.send_session_stopped(record.duration_seconds / 60);
                    }
                }
                EngineEvent::PersistenceFailed { message } => {
                    warn!(%message, "study log not saved");
                    notifier.send_alert(
                        "Cadence".to_string(),
                        self.translator
                            .format("error.persistence", &[("message", &message)]),
                    );
                }
            }
        }
    }
}

fn outcome(result: Result<(), cadence_core::InvalidTransition>) -> CommandOutcome {
    match result {
        Ok(()) => CommandOutcome::Applied,
        Err(error) => CommandOutcome::Ignored(error.to_string()),
    }
}
