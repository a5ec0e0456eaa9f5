//! Cadence protocol definitions for CLI-daemon communication
//!
//! This crate defines the IPC protocol between the cadence CLI and daemon.
//! All types are serializable with bincode for efficient binary communication.

use serde::{Deserialize, Serialize};

pub use cadence_core::domain::BreakInterval;
pub use cadence_core::{Phase, PopupKind, PopupStatus, SettingsPatch, StatusSnapshot, StudySettings};

/// Requests sent from CLI to daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Start a study cycle
    StartSession {
        /// Cycle length in minutes for this session only (None = stored setting)
        cycle_minutes: Option<u64>,
    },
    /// Stop the running session and record the studied time
    StopSession,
    /// Pause the running session, or resume it when already paused
    PauseSession,
    /// Resume a paused session
    ResumeSession,
    /// Close the break popup currently shown
    DismissBreak,
    /// Get the timer status
    GetStatus,
    /// Get the stored study settings
    GetSettings,
    /// Change some of the stored study settings
    UpdateSettings(SettingsPatch),
    /// Delete the study history, keeping the settings
    ClearHistory,
    /// Ping the daemon to check if it's alive
    Ping,
}

/// Responses sent from daemon to CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Timer status
    Status(StatusSnapshot),
    /// Stored study settings
    Settings(SettingsView),
    /// Generic success acknowledgment
    Ok,
    /// The request did not apply in the current phase; nothing changed
    Ignored { reason: String },
    /// Error response with message
    Error { message: String },
    /// Pong response to ping
    Pong,
}

/// Study settings as sent over the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsView {
    pub cycle_minutes: u64,
    pub break_interval: BreakInterval,
    pub auto_pause_media: bool,
    pub auto_resume_media: bool,
}

impl From<&StudySettings> for SettingsView {
    fn from(settings: &StudySettings) -> Self {
        Self {
            cycle_minutes: settings.cycle_minutes,
            break_interval: settings.break_interval,
            auto_pause_media: settings.auto_pause_media,
            auto_resume_media: settings.auto_resume_media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::PopupToken;

    fn roundtrip<T>(value: &T) -> T
    where
        T: Serialize + for<'de> Deserialize<'de>,
    {
        let bytes = bincode::serialize(value).unwrap();
        bincode::deserialize(&bytes).unwrap()
    }

    #[test]
    fn request_start_session_serialization() {
        let request = Request::StartSession {
            cycle_minutes: Some(45),
        };

        assert_eq!(roundtrip(&request), request);
    }

    #[test]
    fn request_update_settings_serialization() {
        let request = Request::UpdateSettings(SettingsPatch {
            cycle_minutes: None,
            break_interval: Some(BreakInterval::Minutes10To15),
            auto_pause_media: Some(false),
            auto_resume_media: None,
        });

        assert_eq!(roundtrip(&request), request);
    }

    #[test]
    fn request_variants_serialization() {
        let requests = vec![
            Request::StartSession { cycle_minutes: None },
            Request::StopSession,
            Request::PauseSession,
            Request::ResumeSession,
            Request::DismissBreak,
            Request::GetStatus,
            Request::GetSettings,
            Request::ClearHistory,
            Request::Ping,
        ];

        for request in requests {
            assert_eq!(roundtrip(&request), request);
        }
    }

    #[test]
    fn response_status_serialization() {
        let response = Response::Status(StatusSnapshot {
            phase: Phase::ShortBreakActive,
            remaining_seconds: 4321,
            studied_seconds: 1079,
            cycle_seconds: 5400,
            next_break_in_seconds: None,
            pause_resumes_in_seconds: None,
            popup: Some(PopupStatus {
                token: PopupToken::new(3),
                kind: PopupKind::ShortBreak,
                remaining_seconds: 7,
            }),
            long_break_elapsed_seconds: None,
        });

        assert_eq!(roundtrip(&response), response);
    }

    #[test]
    fn response_settings_carries_stored_values() {
        let mut settings = StudySettings::default();
        settings.cycle_minutes = 60;
        settings.break_interval = BreakInterval::Minutes5To7;

        let response = Response::Settings(SettingsView::from(&settings));

        match roundtrip(&response) {
            Response::Settings(view) => {
                assert_eq!(view.cycle_minutes, 60);
                assert_eq!(view.break_interval, BreakInterval::Minutes5To7);
                assert!(view.auto_pause_media);
            }
            other => panic!("expected settings, got {:?}", other),
        }
    }

    #[test]
    fn response_variants_serialization() {
        let responses = vec![
            Response::Ok,
            Response::Ignored {
                reason: "cannot pause while idle".to_string(),
            },
            Response::Error {
                message: "cycle length must be between 1 and 180 minutes".to_string(),
            },
            Response::Pong,
        ];

        for response in responses {
            assert_eq!(roundtrip(&response), response);
        }
    }
}
