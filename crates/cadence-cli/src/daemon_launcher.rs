use anyhow::{bail, Context, Result};
use cadence_core::Translator;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;

use crate::client::default_socket_path;

const DAEMON_STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
const DAEMON_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DAEMON_PATH_VARIABLE: &str = "CADENCE_DAEMON_PATH";

pub async fn ensure_daemon_running(translator: &Translator) -> Result<()> {
    println!("{}", translator.get("cli.daemon_starting"));

    spawn_daemon()?;
    wait_for_socket(&default_socket_path(), DAEMON_STARTUP_TIMEOUT).await?;

    Ok(())
}

fn spawn_daemon() -> Result<()> {
    let daemon_path = find_daemon_binary()?;

    Command::new(&daemon_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch {}", daemon_path.display()))?;

    Ok(())
}

fn find_daemon_binary() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(DAEMON_PATH_VARIABLE) {
        return Ok(PathBuf::from(path));
    }

    let current_exe = std::env::current_exe().context("cannot locate the cadence executable")?;
    let exe_dir = current_exe
        .parent()
        .context("cannot locate the executable directory")?;

    let daemon_name = if cfg!(windows) {
        "cadence-daemon.exe"
    } else {
        "cadence-daemon"
    };

    let sibling_path = exe_dir.join(daemon_name);
    if sibling_path.exists() {
        return Ok(sibling_path);
    }

    if let Ok(path) = which::which(daemon_name) {
        return Ok(path);
    }

    bail!(
        "cadence-daemon not found. Make sure it is installed or set {}",
        DAEMON_PATH_VARIABLE
    );
}

async fn wait_for_socket(socket_path: &Path, limit: Duration) -> Result<()> {
    let start = std::time::Instant::now();

    while start.elapsed() < limit {
        if socket_path.exists() {
            return Ok(());
        }
        sleep(DAEMON_POLL_INTERVAL).await;
    }

    bail!(
        "timeout: the daemon did not start within {} seconds",
        limit.as_secs()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_for_socket_returns_once_file_exists() {
        let directory = tempfile::tempdir().unwrap();
        let socket_path = directory.path().join("cadence.sock");
        let writer_path = socket_path.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(150)).await;
            std::fs::write(writer_path, b"").unwrap();
        });

        wait_for_socket(&socket_path, Duration::from_secs(2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wait_for_socket_gives_up_after_limit() {
        let directory = tempfile::tempdir().unwrap();

        let result = wait_for_socket(
            &directory.path().join("never.sock"),
            Duration::from_millis(250),
        )
        .await;

        assert!(result.is_err());
    }
}
