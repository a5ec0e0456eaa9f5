use crate::actors::{CommandOutcome, TimerHandle};
use anyhow::{Context, Result};
use cadence_protocol::{Request, Response, SettingsView};
use interprocess::local_socket::{
    tokio::{prelude::*, Stream},
    GenericFilePath, ListenerOptions,
};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, instrument};

const MAX_FRAME_BYTES: usize = 64 * 1024;
const TIMER_UNAVAILABLE: &str = "timer unavailable";

pub fn default_socket_path() -> PathBuf {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/run/user/{}/cadence.sock", uid))
}

pub struct Server {
    socket_path: PathBuf,
    timer_handle: TimerHandle,
}

impl Server {
    pub fn new(timer_handle: TimerHandle) -> Self {
        Self::with_socket_path(timer_handle, default_socket_path())
    }

    pub fn with_socket_path(timer_handle: TimerHandle, socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timer_handle,
        }
    }

    fn cleanup_stale_socket(&self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .context("failed to remove stale socket")?;
            debug!("removed stale socket file");
        }
        Ok(())
    }

    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) -> Result<()> {
        self.cleanup_stale_socket()?;

        let listener = ListenerOptions::new()
            .name(self.socket_path.as_os_str().to_fs_name::<GenericFilePath>()?)
            .create_tokio()?;

        info!(path = %self.socket_path.display(), "server listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok(stream) => {
                            let timer_handle = self.timer_handle.clone();
                            tokio::spawn(async move {
                                if let Err(error) = handle_connection(stream, timer_handle).await {
                                    error!(%error, "connection handler failed");
                                }
                            });
                        }
                        Err(error) => {
                            error!(%error, "failed to accept connection");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        self.cleanup_socket();
        Ok(())
    }

    fn cleanup_socket(&self) {
        if let Err(error) = std::fs::remove_file(&self.socket_path) {
            debug!(%error, "socket file already removed");
        } else {
            debug!("socket file cleaned up");
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.cleanup_socket();
    }
}

async fn handle_connection(mut stream: Stream, timer_handle: TimerHandle) -> Result<()> {
    debug!("new connection accepted");

    let mut length_buffer = [0u8; 4];
    stream.read_exact(&mut length_buffer).await?;
    let length = u32::from_le_bytes(length_buffer) as usize;
    if length > MAX_FRAME_BYTES {
        anyhow::bail!("request frame of {} bytes rejected", length);
    }

    let mut payload = vec![0u8; length];
    stream.read_exact(&mut payload).await?;

    let request: Request =
        bincode::deserialize(&payload).context("failed to deserialize request")?;

    debug!(?request, "received request");

    let response = handle_request(request, &timer_handle).await;

    debug!(?response, "sending response");

    let response_bytes = bincode::serialize(&response)?;
    let response_length = (response_bytes.len() as u32).to_le_bytes();

    stream.write_all(&response_length).await?;
    stream.write_all(&response_bytes).await?;
    stream.flush().await?;

    Ok(())
}

async fn handle_request(request: Request, timer_handle: &TimerHandle) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::GetStatus => match timer_handle.get_status().await {
            Some(status) => Response::Status(status),
            None => unavailable(),
        },

        Request::GetSettings => match timer_handle.get_settings().await {
            Some(settings) => Response::Settings(SettingsView::from(&settings)),
            None => unavailable(),
        },

        Request::UpdateSettings(patch) => match timer_handle.update_settings(patch).await {
            Some(Ok(settings)) => Response::Settings(SettingsView::from(&settings)),
            Some(Err(message)) => Response::Error { message },
            None => unavailable(),
        },

        Request::StartSession { cycle_minutes } => {
            outcome_response(timer_handle.start(cycle_minutes).await)
        }
        Request::StopSession => outcome_response(timer_handle.stop().await),
        Request::PauseSession => outcome_response(timer_handle.pause().await),
        Request::ResumeSession => outcome_response(timer_handle.resume().await),
        Request::DismissBreak => outcome_response(timer_handle.dismiss_break().await),
        Request::ClearHistory => outcome_response(timer_handle.clear_history().await),
    }
}

fn outcome_response(outcome: Option<CommandOutcome>) -> Response {
    match outcome {
        Some(CommandOutcome::Applied) => Response::Ok,
        Some(CommandOutcome::Ignored(reason)) => Response::Ignored { reason },
        Some(CommandOutcome::Failed(message)) => Response::Error { message },
        None => unavailable(),
    }
}

fn unavailable() -> Response {
    Response::Error {
        message: TIMER_UNAVAILABLE.to_string(),
    }
}
