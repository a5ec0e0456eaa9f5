use anyhow::{anyhow, bail, Result};
use cadence_core::domain::DEFAULT_CYCLE_MINUTES;
use cadence_protocol::{Request, Response};

use super::common::{exit_daemon_not_running, get_translator};
use crate::client::{ClientError, DaemonClient};
use crate::daemon_launcher::ensure_daemon_running;

pub async fn execute(minutes: Option<u64>) -> Result<()> {
    let translator = get_translator();
    let client = DaemonClient::new();
    let request = Request::StartSession {
        cycle_minutes: minutes,
    };

    let response = match client.send(request.clone()).await {
        Err(ClientError::DaemonNotRunning) => {
            ensure_daemon_running(&translator).await.map_err(|error| {
                anyhow!(
                    "{}",
                    translator.format("error.daemon_launch", &[("message", &error.to_string())])
                )
            })?;
            client.send(request).await
        }
        other => other,
    };

    match response {
        Ok(Response::Ok) => {
            let cycle_minutes = match client.send(Request::GetStatus).await {
                Ok(Response::Status(status)) => status.cycle_seconds / 60,
                _ => minutes.unwrap_or(DEFAULT_CYCLE_MINUTES),
            };
            println!(
                "{}",
                translator.format(
                    "cli.session_started",
                    &[("duration", &translator.minutes(cycle_minutes))],
                )
            );
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
