use anyhow::{bail, Result};
use cadence_protocol::{Phase, Request, Response};

use super::common::{exit_daemon_not_running, get_translator};
use crate::client::{ClientError, DaemonClient};

/// Pause toggles: on a paused session the daemon resumes it, so the phase is
/// read back to report which way it went.
pub async fn execute() -> Result<()> {
    let translator = get_translator();
    let client = DaemonClient::new();

    match client.send(Request::PauseSession).await {
        Ok(Response::Ok) => {
            let key = match client.send(Request::GetStatus).await {
                Ok(Response::Status(status)) if status.phase != Phase::Paused => {
                    "cli.session_resumed"
                }
                _ => "cli.session_paused",
            };
            println!("{}", translator.get(key));
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
