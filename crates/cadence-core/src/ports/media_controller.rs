use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Playing,
    Paused,
    Unknown,
    NoSession,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Unknown => "unknown",
            PlaybackState::NoSession => "no session",
        };
        write!(f, "{}", label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaControlError {
    #[error("media control unavailable: {message}")]
    Unavailable { message: String },

    #[error("media command failed: {message}")]
    Command { message: String },
}

/// Desktop media playback. Implementations report what they observe; callers
/// re-query the state instead of trusting the outcome of a toggle.
pub trait MediaController: Send + Sync {
    fn playback_state(&self) -> Result<PlaybackState, MediaControlError>;

    fn toggle_playback(&self) -> Result<String, MediaControlError>;
}
