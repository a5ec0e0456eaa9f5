use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifies one shown popup. Completions carrying any other token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PopupToken(u64);

impl PopupToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PopupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupKind {
    ShortBreak,
    LongBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRequest {
    pub token: PopupToken,
    pub kind: PopupKind,
    pub duration: Duration,
}

/// Shows break countdowns.
///
/// For every `show_countdown` the presenter must eventually report completion
/// of `request.token` back to the engine (natural expiry or operator
/// dismissal), unless the engine withdrew the popup with `dismiss` first.
pub trait BreakPresenter: Send + Sync {
    fn show_countdown(&self, request: PopupRequest);

    fn dismiss(&self, token: PopupToken);
}
