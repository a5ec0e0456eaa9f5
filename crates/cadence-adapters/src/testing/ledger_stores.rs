use std::sync::Mutex;

use cadence_core::{LearningLedger, LedgerStore, LedgerStoreError};

#[derive(Default)]
pub struct InMemoryLedgerStore {
    stored: Mutex<Option<LearningLedger>>,
}

impl InMemoryLedgerStore {
    pub fn stored(&self) -> Option<LearningLedger> {
        self.stored.lock().unwrap().clone()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> Result<Option<LearningLedger>, LedgerStoreError> {
        Ok(self.stored())
    }

    fn save(&self, ledger: &LearningLedger) -> Result<(), LedgerStoreError> {
        *self.stored.lock().unwrap() = Some(ledger.clone());
        Ok(())
    }
}

pub struct FailingLedgerStore {
    error: LedgerStoreError,
}

impl FailingLedgerStore {
    pub fn disk_full() -> Self {
        Self {
            error: LedgerStoreError::Write {
                message: "no space left on device".to_string(),
            },
        }
    }

    pub fn corrupted() -> Self {
        Self {
            error: LedgerStoreError::Corrupted {
                message: "expected value at line 1 column 1".to_string(),
            },
        }
    }
}

impl LedgerStore for FailingLedgerStore {
    fn load(&self) -> Result<Option<LearningLedger>, LedgerStoreError> {
        Err(self.error.clone())
    }

    fn save(&self, _ledger: &LearningLedger) -> Result<(), LedgerStoreError> {
        Err(self.error.clone())
    }
}
