use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, warn};

use cadence_core::{LearningLedger, LedgerStore, LedgerStoreError};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Study log kept as one pretty-printed JSON document. Writes go through a
/// sibling temp file and a rename so a crash never leaves half a document.
pub struct JsonLedgerStore {
    path: PathBuf,
    backup_corrupted: bool,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_corrupted: false,
        }
    }

    /// Copies an unparseable file to `<name>.corrupt-<timestamp>` before
    /// reporting it. For owners that go on to overwrite the file.
    pub fn with_corrupt_backup(mut self) -> Self {
        self.backup_corrupted = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, "tmp")
    }

    fn backup_corrupted(&self) -> Option<PathBuf> {
        let suffix = format!("corrupt-{}", Local::now().format(BACKUP_TIMESTAMP_FORMAT));
        let backup = sibling(&self.path, &suffix);
        match fs::copy(&self.path, &backup) {
            Ok(_) => Some(backup),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "could not back up corrupted study log");
                None
            }
        }
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self) -> Result<Option<LearningLedger>, LedgerStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no study log yet");
                return Ok(None);
            }
            Err(error) => {
                return Err(LedgerStoreError::Read {
                    message: format!("{}: {}", self.path.display(), error),
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content).map(Some).map_err(|error| {
            let backup = if self.backup_corrupted {
                self.backup_corrupted()
            } else {
                None
            };
            let message = match backup {
                Some(backup) => format!("{} (copy kept at {})", error, backup.display()),
                None => error.to_string(),
            };
            LedgerStoreError::Corrupted { message }
        })
    }

    fn save(&self, ledger: &LearningLedger) -> Result<(), LedgerStoreError> {
        let write_error = |error: std::io::Error| LedgerStoreError::Write {
            message: format!("{}: {}", self.path.display(), error),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        let content =
            serde_json::to_string_pretty(ledger).map_err(|error| LedgerStoreError::Write {
                message: error.to_string(),
            })?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(write_error)?;
        fs::rename(&temp_path, &self.path).map_err(|error| {
            let _ = fs::remove_file(&temp_path);
            write_error(error)
        })?;

        debug!(path = %self.path.display(), "study log saved");
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
