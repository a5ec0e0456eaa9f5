use anyhow::Result;
use cadence_core::Translator;
use cadence_protocol::{Phase, Request, Response, StatusSnapshot};

use super::common::{format_duration, get_translator};
use crate::client::{ClientError, DaemonClient};

pub async fn execute(json: bool) -> Result<()> {
    let translator = get_translator();
    let client = DaemonClient::new();

    match client.send(Request::GetStatus).await {
        Ok(Response::Status(status)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                for line in describe(&status, &translator) {
                    println!("{}", line);
                }
            }
        }
        Ok(Response::Error { message }) => {
            if json {
                println!("{}", serde_json::json!({ "error": message }));
            } else {
                eprintln!("{}", message);
            }
            std::process::exit(1);
        }
        Ok(_) => {
            if json {
                println!("{}", serde_json::json!({ "error": "unexpected response" }));
            } else {
                eprintln!("{}", translator.get("error.unexpected_response"));
            }
            std::process::exit(1);
        }
        Err(ClientError::DaemonNotRunning) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "error": "daemon not running", "phase": Phase::Idle })
                );
            } else {
                println!("{}", translator.get("error.daemon_not_running"));
            }
        }
        Err(error) => {
            if json {
                println!("{}", serde_json::json!({ "error": error.to_string() }));
            } else {
                eprintln!("{}", error);
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

fn describe(status: &StatusSnapshot, translator: &Translator) -> Vec<String> {
    let phase = translator.phase(status.phase);
    let mut lines = vec![translator.format("cli.status_phase", &[("phase", &phase)])];

    if status.phase != Phase::Idle && status.phase != Phase::LongBreakActive {
        lines.push(translator.format(
            "cli.status_remaining",
            &[("time", &format_duration(status.remaining_seconds))],
        ));
        lines.push(translator.format(
            "cli.status_studied",
            &[("time", &format_duration(status.studied_seconds))],
        ));
    }

    if let Some(seconds) = status.next_break_in_seconds {
        lines.push(translator.format("cli.status_next_break", &[("time", &format_duration(seconds))]));
    }
    if let Some(seconds) = status.pause_resumes_in_seconds {
        lines.push(translator.format(
            "cli.status_pause_resumes",
            &[("time", &format_duration(seconds))],
        ));
    }
    if let Some(popup) = &status.popup {
        lines.push(translator.format(
            "cli.status_popup",
            &[
                ("token", &popup.token.to_string()),
                ("seconds", &popup.remaining_seconds.to_string()),
            ],
        ));
    }
    if let Some(seconds) = status.long_break_elapsed_seconds {
        lines.push(translator.format(
            "cli.status_long_break",
            &[("time", &format_duration(seconds))],
        ));
    }

    lines
}
