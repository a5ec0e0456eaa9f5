use std::time::Duration;

use cadence_core::{NotificationSound, NotificationUrgency, PopupKind, Translator};
use notify_rust::{Notification, Timeout, Urgency};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const APP_NAME: &str = "Cadence";
const CHIME_SOUND: &str = "message-new-instant";
const CHIME_TIMEOUT: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq)]
pub enum NotifierMessage {
    SessionStarted { cycle_minutes: u64 },
    SessionStopped { studied_minutes: u64 },
    SessionPaused,
    SessionResumed,
    BreakStarted { kind: PopupKind, duration: Duration },
    BreakOver { kind: PopupKind },
    Chime,
    Alert { title: String, body: String },
}

#[derive(Clone)]
pub struct NotifierHandle {
    sender: mpsc::Sender<NotifierMessage>,
}

impl NotifierHandle {
    pub fn send_session_started(&self, cycle_minutes: u64) {
        self.send(NotifierMessage::SessionStarted { cycle_minutes });
    }

    pub fn send_session_stopped(&self, studied_minutes: u64) {
        self.send(NotifierMessage::SessionStopped { studied_minutes });
    }

    pub fn send_session_paused(&self) {
        self.send(NotifierMessage::SessionPaused);
    }

    pub fn send_session_resumed(&self) {
        self.send(NotifierMessage::SessionResumed);
    }

    pub fn send_break_started(&self, kind: PopupKind, duration: Duration) {
        self.send(NotifierMessage::BreakStarted { kind, duration });
    }

    pub fn send_break_over(&self, kind: PopupKind) {
        self.send(NotifierMessage::BreakOver { kind });
    }

    pub fn send_chime(&self) {
        self.send(NotifierMessage::Chime);
    }

    pub fn send_alert(&self, title: String, body: String) {
        self.send(NotifierMessage::Alert { title, body });
    }

    fn send(&self, message: NotifierMessage) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if let Err(error) = sender.send(message).await {
                error!(%error, "failed to send notification message");
            }
        });
    }

    #[cfg(test)]
    pub fn channel() -> (Self, mpsc::Receiver<NotifierMessage>) {
        let (sender, receiver) = mpsc::channel(32);
        (Self { sender }, receiver)
    }
}

/// Audible cue played through the notification daemon's sound hint.
pub struct NotifierSound {
    notifier: NotifierHandle,
    enabled: bool,
}

impl NotifierSound {
    pub fn new(notifier: NotifierHandle, enabled: bool) -> Self {
        Self { notifier, enabled }
    }
}

impl NotificationSound for NotifierSound {
    fn play_notification(&self) {
        if self.enabled {
            self.notifier.send_chime();
        }
    }
}

pub struct NotifierActor {
    receiver: mpsc::Receiver<NotifierMessage>,
    translator: Translator,
    urgency: Urgency,
}

impl NotifierActor {
    pub fn new(translator: Translator, urgency: NotificationUrgency) -> (Self, NotifierHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let urgency = match urgency {
            NotificationUrgency::Low => Urgency::Low,
            NotificationUrgency::Normal => Urgency::Normal,
            NotificationUrgency::Critical => Urgency::Critical,
        };

        let actor = Self {
            receiver,
            translator,
            urgency,
        };

        let handle = NotifierHandle { sender };

        (actor, handle)
    }

    pub async fn run(mut self) {
        info!(language = %self.translator.language(), "notifier actor started");

        while let Some(message) = self.receiver.recv().await {
            debug!(?message, "notification requested");
            let notification = self.build(&message);
            if let Err(error) = notification.show() {
                warn!(%error, ?message, "failed to show notification");
            }
        }

        debug!("notifier actor stopped");
    }

    fn build(&self, message: &NotifierMessage) -> Notification {
        let translator = &self.translator;
        match message {
            NotifierMessage::SessionStarted { cycle_minutes } => self.notification(
                APP_NAME,
                &translator.format(
                    "session.started",
                    &[("duration", &translator.minutes(*cycle_minutes))],
                ),
            ),
            NotifierMessage::SessionStopped { studied_minutes } => self.notification(
                &translator.get("session.stopped"),
                &translator.format(
                    "session.recorded",
                    &[("duration", &translator.minutes(*studied_minutes))],
                ),
            ),
            NotifierMessage::SessionPaused => {
                self.notification(APP_NAME, &translator.get("session.paused"))
            }
            NotifierMessage::SessionResumed => {
                self.notification(APP_NAME, &translator.get("session.resumed"))
            }
            NotifierMessage::BreakStarted { kind, duration } => {
                let body = match kind {
                    PopupKind::ShortBreak => translator.format(
                        "break.short_body",
                        &[("seconds", &duration.as_secs().to_string())],
                    ),
                    PopupKind::LongBreak => translator.format(
                        "break.long_body",
                        &[("duration", &translator.minutes(duration.as_secs() / 60))],
                    ),
                };
                let mut notification = self.notification(&translator.break_title(*kind), &body);
                notification.timeout(Timeout::Milliseconds(duration_millis(*duration)));
                notification
            }
            NotifierMessage::BreakOver { kind } => {
                self.notification(APP_NAME, &translator.break_over(*kind))
            }
            NotifierMessage::Chime => {
                let mut notification = self.notification(APP_NAME, "");
                notification
                    .sound_name(CHIME_SOUND)
                    .timeout(Timeout::Milliseconds(duration_millis(CHIME_TIMEOUT)));
                notification
            }
            NotifierMessage::Alert { title, body } => {
                let mut notification = self.notification(title, body);
                notification.urgency(Urgency::Critical);
                notification
            }
        }
    }

    fn notification(&self, summary: &str, body: &str) -> Notification {
        let mut notification = Notification::new();
        notification
            .summary(summary)
            .body(body)
            .urgency(self.urgency)
            .appname(APP_NAME);
        notification
    }
}

fn duration_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
