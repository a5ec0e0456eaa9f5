use thiserror::Error;

use crate::domain::LearningLedger;

#[derive(Error, Debug, Clone)]
pub enum LedgerStoreError {
    #[error("study log unreadable: {message}")]
    Read { message: String },

    #[error("study log corrupted: {message}")]
    Corrupted { message: String },

    #[error("failed to write study log: {message}")]
    Write { message: String },
}

pub trait LedgerStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<LearningLedger>, LedgerStoreError>;

    /// Replaces the stored ledger with `ledger` as a whole.
    fn save(&self, ledger: &LearningLedger) -> Result<(), LedgerStoreError>;
}
