use anyhow::Result;
use cadence_protocol::Request;

use super::common::send_command;

pub async fn execute() -> Result<()> {
    send_command(Request::DismissBreak, "cli.break_dismissed").await
}
