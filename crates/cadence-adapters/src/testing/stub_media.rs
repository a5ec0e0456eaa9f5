use std::sync::Mutex;

use cadence_core::{MediaControlError, MediaController, PlaybackState};

/// Player whose toggle flips between playing and paused.
pub struct StubMediaController {
    state: Mutex<PlaybackState>,
    toggles: Mutex<usize>,
}

impl StubMediaController {
    pub fn new(state: PlaybackState) -> Self {
        Self {
            state: Mutex::new(state),
            toggles: Mutex::new(0),
        }
    }

    pub fn playing() -> Self {
        Self::new(PlaybackState::Playing)
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock().unwrap()
    }

    pub fn toggle_count(&self) -> usize {
        *self.toggles.lock().unwrap()
    }
}

impl MediaController for StubMediaController {
    fn playback_state(&self) -> Result<PlaybackState, MediaControlError> {
        Ok(self.state())
    }

    fn toggle_playback(&self) -> Result<String, MediaControlError> {
        let mut state = self.state.lock().unwrap();
        *state = match *state {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Unknown | PlaybackState::NoSession => {
                return Err(MediaControlError::Unavailable {
                    message: "no media session".to_string(),
                })
            }
        };
        *self.toggles.lock().unwrap() += 1;
        Ok("toggled".to_string())
    }
}
