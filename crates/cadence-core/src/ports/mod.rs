mod break_presenter;
mod ledger_store;
mod media_controller;
mod notification_sound;

pub use break_presenter::{BreakPresenter, PopupKind, PopupRequest, PopupToken};
pub use ledger_store::{LedgerStore, LedgerStoreError};
pub use media_controller::{MediaControlError, MediaController, PlaybackState};
pub use notification_sound::NotificationSound;
