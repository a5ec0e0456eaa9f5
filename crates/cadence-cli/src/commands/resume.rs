use anyhow::Result;
use cadence_protocol::Request;

use super::common::send_command;

pub async fn execute() -> Result<()> {
    send_command(Request::ResumeSession, "cli.session_resumed").await
}
