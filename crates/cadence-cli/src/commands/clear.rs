use anyhow::{bail, Result};
use cadence_core::LedgerStore;
use cadence_protocol::{Request, Response};
use dialoguer::Confirm;

use super::common::{get_translator, ledger_store};
use crate::client::{ClientError, DaemonClient};

pub async fn execute(skip_confirmation: bool) -> Result<()> {
    let translator = get_translator();

    if !skip_confirmation {
        let confirmed = Confirm::new()
            .with_prompt(translator.get("cli.clear_confirm"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", translator.get("cli.clear_cancelled"));
            return Ok(());
        }
    }

    match DaemonClient::new().send(Request::ClearHistory).await {
        Ok(Response::Ok) => {}
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("{}", translator.get("error.unexpected_response")),
        Err(ClientError::DaemonNotRunning) => clear_offline()?,
        Err(ClientError::Timeout) => bail!("{}", translator.get("error.timeout")),
        Err(error) => bail!("{}", error),
    }

    println!("{}", translator.get("cli.clear_done"));
    Ok(())
}

/// Clears the study log file directly; settings are kept.
fn clear_offline() -> Result<()> {
    let store = ledger_store();
    if let Some(mut ledger) = store.load()? {
        ledger.clear();
        store.save(&ledger)?;
    }
    Ok(())
}
