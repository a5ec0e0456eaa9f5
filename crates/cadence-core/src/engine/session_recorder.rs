use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{
    aggregate, CycleConfigError, LearningLedger, Period, PeriodTotals, SessionRecord,
    SettingsPatch, StudySettings,
};
use crate::ports::{LedgerStore, LedgerStoreError};

#[derive(Error, Debug, Clone)]
pub enum RecorderError {
    #[error("study log not saved, the change is kept in memory: {0}")]
    PersistenceWriteFailure(#[from] LedgerStoreError),

    #[error(transparent)]
    InvalidSettings(#[from] CycleConfigError),
}

/// Owns the learning ledger and writes it through after every change.
pub struct SessionRecorder {
    ledger: LearningLedger,
    store: Arc<dyn LedgerStore>,
}

impl SessionRecorder {
    /// Loads the ledger once. A missing or unreadable file yields defaults.
    pub fn load(store: Arc<dyn LedgerStore>) -> Self {
        let ledger = match store.load() {
            Ok(Some(ledger)) => {
                info!(sessions = ledger.session_count(), "study log loaded");
                ledger
            }
            Ok(None) => {
                debug!("no study log yet, starting empty");
                LearningLedger::default()
            }
            Err(error) => {
                warn!(%error, "study log unreadable, starting from defaults");
                LearningLedger::default()
            }
        };

        Self { ledger, store }
    }

    pub fn ledger(&self) -> &LearningLedger {
        &self.ledger
    }

    pub fn settings(&self) -> &StudySettings {
        &self.ledger.settings
    }

    /// Appends `record` under `day`, updates the totals and persists. On a
    /// write failure the in-memory ledger keeps the record so the next
    /// successful write includes it.
    pub fn record(&mut self, day: NaiveDate, record: SessionRecord) -> Result<(), RecorderError> {
        debug!(
            %day,
            duration_seconds = record.duration_seconds,
            completed_cycle = record.completed_cycle,
            cycle_fraction = record.cycle_fraction,
            "recording session"
        );
        self.ledger.append(day, record);
        self.persist()
    }

    pub fn aggregate(&self, period: Period) -> BTreeMap<String, PeriodTotals> {
        aggregate(&self.ledger, period)
    }

    /// Empties the log and totals; settings survive.
    pub fn clear(&mut self) -> Result<(), RecorderError> {
        self.ledger.clear();
        info!("study log cleared");
        self.persist()
    }

    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<StudySettings, RecorderError> {
        self.ledger.settings.apply(patch)?;
        info!(settings = ?self.ledger.settings, "study settings updated");
        self.persist()?;
        Ok(self.ledger.settings.clone())
    }

    fn persist(&self) -> Result<(), RecorderError> {
        self.store.save(&self.ledger).map_err(|error| {
            error!(%error, "failed to persist study log");
            RecorderError::from(error)
        })
    }
}
