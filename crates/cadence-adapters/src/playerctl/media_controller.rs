use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::debug;

use cadence_core::{MediaControlError, MediaController, PlaybackState};

const NO_PLAYERS_MESSAGE: &str = "no players found";

/// Media control through the MPRIS `playerctl` command line tool.
pub struct PlayerctlMediaController {
    binary: PathBuf,
    player: Option<String>,
}

impl PlayerctlMediaController {
    /// Locates `playerctl` on `PATH`.
    pub fn detect(player: Option<String>) -> Result<Self, MediaControlError> {
        let binary = which::which("playerctl").map_err(|error| MediaControlError::Unavailable {
            message: format!("playerctl not found: {}", error),
        })?;
        Ok(Self::with_binary(binary, player))
    }

    pub fn with_binary(binary: impl Into<PathBuf>, player: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            player,
        }
    }

    fn run(&self, action: &str) -> Result<Output, MediaControlError> {
        let mut command = Command::new(&self.binary);
        if let Some(player) = &self.player {
            command.arg(format!("--player={}", player));
        }
        command.arg(action);

        command.output().map_err(|error| match error.kind() {
            ErrorKind::NotFound => MediaControlError::Unavailable {
                message: format!("{} not found", self.binary.display()),
            },
            _ => MediaControlError::Command {
                message: format!("playerctl {}: {}", action, error),
            },
        })
    }

    fn target(&self) -> &str {
        self.player.as_deref().unwrap_or("active player")
    }
}

impl MediaController for PlayerctlMediaController {
    fn playback_state(&self) -> Result<PlaybackState, MediaControlError> {
        let output = self.run("status")?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            let state = parse_status(&stdout);
            debug!(player = self.target(), %state, "media status");
            return Ok(state);
        }

        if stderr.to_lowercase().contains(NO_PLAYERS_MESSAGE) {
            return Ok(PlaybackState::NoSession);
        }

        Err(MediaControlError::Command {
            message: format!("playerctl status: {}", stderr.trim()),
        })
    }

    fn toggle_playback(&self) -> Result<String, MediaControlError> {
        let output = self.run("play-pause")?;

        if output.status.success() {
            return Ok(format!("toggled playback of {}", self.target()));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.to_lowercase().contains(NO_PLAYERS_MESSAGE) {
            return Err(MediaControlError::Unavailable {
                message: "no media session".to_string(),
            });
        }

        Err(MediaControlError::Command {
            message: format!("playerctl play-pause: {}", stderr.trim()),
        })
    }
}

/// Maps `playerctl status` output to a playback state. `Stopped` is neither
/// playing nor resumable, so it reads as unknown.
pub fn parse_status(output: &str) -> PlaybackState {
    match output.trim().to_lowercase().as_str() {
        "playing" => PlaybackState::Playing,
        "paused" => PlaybackState::Paused,
        "" => PlaybackState::NoSession,
        _ => PlaybackState::Unknown,
    }
}
