use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::LearningLedger;
use crate::ports::{
    BreakPresenter, LedgerStore, LedgerStoreError, MediaControlError, MediaController,
    NotificationSound, PlaybackState, PopupRequest, PopupToken,
};

#[derive(Default)]
pub struct MemoryStore {
    stored: Mutex<Option<LearningLedger>>,
    corrupted: bool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_ledger(ledger: LearningLedger) -> Self {
        Self {
            stored: Mutex::new(Some(ledger)),
            ..Self::default()
        }
    }

    pub fn corrupted() -> Self {
        Self {
            corrupted: true,
            ..Self::default()
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Option<LearningLedger> {
        self.stored.lock().unwrap().clone()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<LearningLedger>, LedgerStoreError> {
        if self.corrupted {
            return Err(LedgerStoreError::Corrupted {
                message: "expected value at line 1 column 1".to_string(),
            });
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    fn save(&self, ledger: &LearningLedger) -> Result<(), LedgerStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerStoreError::Write {
                message: "disk full".to_string(),
            });
        }
        *self.stored.lock().unwrap() = Some(ledger.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    Show(PopupRequest),
    Dismiss(PopupToken),
}

#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shown(&self) -> Vec<PopupRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Show(request) => Some(request),
                PresenterCall::Dismiss(_) => None,
            })
            .collect()
    }

    pub fn last_shown(&self) -> Option<PopupRequest> {
        self.shown().pop()
    }

    pub fn dismissed(&self) -> Vec<PopupToken> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Dismiss(token) => Some(token),
                PresenterCall::Show(_) => None,
            })
            .collect()
    }
}

impl BreakPresenter for RecordingPresenter {
    fn show_countdown(&self, request: PopupRequest) {
        self.calls.lock().unwrap().push(PresenterCall::Show(request));
    }

    fn dismiss(&self, token: PopupToken) {
        self.calls.lock().unwrap().push(PresenterCall::Dismiss(token));
    }
}

#[derive(Default)]
pub struct RecordingSound {
    plays: AtomicUsize,
}

impl RecordingSound {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl NotificationSound for RecordingSound {
    fn play_notification(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }
}

/// Player whose toggle flips between playing and paused.
pub struct ScriptedMedia {
    state: Mutex<Result<PlaybackState, MediaControlError>>,
    toggles: AtomicUsize,
}

impl ScriptedMedia {
    pub fn new(state: PlaybackState) -> Self {
        Self {
            state: Mutex::new(Ok(state)),
            toggles: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            state: Mutex::new(Err(MediaControlError::Unavailable {
                message: "playerctl not found".to_string(),
            })),
            toggles: AtomicUsize::new(0),
        }
    }

    pub fn set_state(&self, state: PlaybackState) {
        *self.state.lock().unwrap() = Ok(state);
    }

    pub fn current(&self) -> Result<PlaybackState, MediaControlError> {
        self.state.lock().unwrap().clone()
    }

    pub fn toggles(&self) -> usize {
        self.toggles.load(Ordering::SeqCst)
    }
}

impl MediaController for ScriptedMedia {
    fn playback_state(&self) -> Result<PlaybackState, MediaControlError> {
        self.current()
    }

    fn toggle_playback(&self) -> Result<String, MediaControlError> {
        let mut state = self.state.lock().unwrap();
        let next = match state.clone()? {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
            other => other,
        };
        *state = Ok(next);
        self.toggles.fetch_add(1, Ordering::SeqCst);
        Ok(format!("now {}", next))
    }
}
