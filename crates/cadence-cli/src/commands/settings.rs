use anyhow::{anyhow, bail, Result};
use cadence_core::{LedgerStore, Translator};
use cadence_protocol::{BreakInterval, Request, Response, SettingsPatch, SettingsView};

use super::common::{get_translator, ledger_store};
use crate::client::{ClientError, DaemonClient};

pub struct SettingsArgs {
    pub cycle: Option<u64>,
    pub interval: Option<String>,
    pub auto_pause_media: Option<bool>,
    pub auto_resume_media: Option<bool>,
}

impl SettingsArgs {
    fn to_patch(&self) -> Result<SettingsPatch> {
        let break_interval = self
            .interval
            .as_deref()
            .map(str::parse::<BreakInterval>)
            .transpose()?;

        Ok(SettingsPatch {
            cycle_minutes: self.cycle,
            break_interval,
            auto_pause_media: self.auto_pause_media,
            auto_resume_media: self.auto_resume_media,
        })
    }
}

pub async fn execute(args: SettingsArgs) -> Result<()> {
    let translator = get_translator();
    let patch = args.to_patch()?;
    let updating = !patch.is_empty();
    let request = if updating {
        Request::UpdateSettings(patch.clone())
    } else {
        Request::GetSettings
    };

    let view = match DaemonClient::new().send(request).await {
        Ok(Response::Settings(view)) => view,
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("{}", translator.get("error.unexpected_response")),
        Err(ClientError::DaemonNotRunning) => settings_offline(&patch)?,
        Err(ClientError::Timeout) => bail!("{}", translator.get("error.timeout")),
        Err(error) => bail!("{}", error),
    };

    if updating {
        println!("{}", translator.get("cli.settings_updated"));
    }
    for line in describe(&view, &translator) {
        println!("{}", line);
    }

    Ok(())
}

/// Reads, and when `patch` carries changes rewrites, the settings stored in
/// the study log while no daemon holds it.
fn settings_offline(patch: &SettingsPatch) -> Result<SettingsView> {
    let store = ledger_store();
    let mut ledger = store.load()?.unwrap_or_default();

    if !patch.is_empty() {
        ledger
            .settings
            .apply(patch)
            .map_err(|error| anyhow!("{}", error))?;
        store.save(&ledger)?;
    }

    Ok(SettingsView::from(&ledger.settings))
}

fn describe(view: &SettingsView, translator: &Translator) -> Vec<String> {
    let yes_no = |value: bool| translator.get(if value { "cli.yes" } else { "cli.no" });

    vec![
        translator.get("cli.settings_title"),
        translator.format(
            "cli.settings_cycle",
            &[("minutes", &view.cycle_minutes.to_string())],
        ),
        translator.format(
            "cli.settings_interval",
            &[("interval", view.break_interval.key())],
        ),
        translator.format(
            "cli.settings_auto_pause",
            &[("value", &yes_no(view.auto_pause_media))],
        ),
        translator.format(
            "cli.settings_auto_resume",
            &[("value", &yes_no(view.auto_resume_media))],
        ),
    ]
}
