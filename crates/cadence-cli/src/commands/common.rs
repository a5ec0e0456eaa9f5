use anyhow::{bail, Result};
use cadence_adapters::JsonLedgerStore;
use cadence_core::{Config, Language, LearningLedger, LedgerStore, Translator};
use cadence_protocol::{Request, Response};

use crate::client::{ClientError, DaemonClient};

pub fn get_translator() -> Translator {
    let language = Config::load()
        .map(|config| config.language())
        .unwrap_or_else(|_| Language::from_environment());
    Translator::new(language)
}

/// Store for commands that read the file or refuse to write over a corrupt
/// one; the daemon alone keeps backups.
pub fn ledger_store() -> JsonLedgerStore {
    let config = Config::load().unwrap_or_default();
    JsonLedgerStore::new(config.data_file_path())
}

/// The study log as stored on disk; empty when nothing was recorded yet.
pub fn load_ledger(translator: &Translator) -> Result<LearningLedger> {
    match ledger_store().load() {
        Ok(ledger) => Ok(ledger.unwrap_or_default()),
        Err(error) => bail!(
            "{}",
            translator.format("error.no_study_log", &[("message", &error.to_string())])
        ),
    }
}

/// Sends a command that answers with `Ok` or `Ignored` and prints the outcome.
pub async fn send_command(request: Request, success_key: &str) -> Result<()> {
    let translator = get_translator();
    let client = DaemonClient::new();

    match client.send(request).await {
        Ok(Response::Ok) => {
            println!("{}", translator.get(success_key));
        }
        Ok(Response::Ignored { reason }) => {
            println!("{}", translator.format("cli.ignored", &[("reason", &reason)]));
        }
        Ok(Response::Error { message }) => {
            bail!("{}", message);
        }
        Ok(_) => {
            bail!("{}", translator.get("error.unexpected_response"));
        }
        Err(ClientError::DaemonNotRunning) => exit_daemon_not_running(&translator),
        Err(ClientError::Timeout) => {
            bail!("{}", translator.get("error.timeout"));
        }
        Err(error) => {
            bail!("{}", error);
        }
    }

    Ok(())
}

pub fn exit_daemon_not_running(translator: &Translator) -> ! {
    eprintln!("{}", translator.get("error.daemon_not_running"));
    eprintln!("{}", translator.get("error.daemon_hint"));
    std::process::exit(1);
}

pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remaining_seconds = seconds % 60;

    if hours > 0 {
        format!("{} h {:02} min", hours, minutes)
    } else if minutes > 0 {
        format!("{} min {} sec", minutes, remaining_seconds)
    } else {
        format!("{} sec", remaining_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_shows_minutes_and_seconds() {
        assert_eq!(format_duration(90), "1 min 30 sec");
        assert_eq!(format_duration(1500), "25 min 0 sec");
    }

    #[test]
    fn format_duration_switches_to_hours() {
        assert_eq!(format_duration(3600), "1 h 00 min");
        assert_eq!(format_duration(5400), "1 h 30 min");
    }

    #[test]
    fn format_duration_shows_only_seconds_when_under_minute() {
        assert_eq!(format_duration(45), "45 sec");
        assert_eq!(format_duration(0), "0 sec");
    }
}
