mod actors;
mod server;

use std::sync::Arc;

use actors::{DesktopBreakPresenter, NotifierActor, NotifierSound, TimerActor, TimerHandle};
use anyhow::Result;
use cadence_adapters::{JsonLedgerStore, PlayerctlMediaController};
use cadence_core::{Config, MediaController, SessionRecorder, SystemClock, TimerEngine, Translator};
use server::Server;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("cadence_daemon=debug".parse()?)
                .add_directive("cadence_core=info".parse()?),
        )
        .init();

    info!("cadence daemon starting");

    let config = Config::load().unwrap_or_else(|error| {
        warn!(%error, "failed to load config, using defaults");
        Config::default()
    });

    let (shutdown_sender, shutdown_receiver) = broadcast::channel::<()>(1);

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("SIGINT received, initiating shutdown");
        shutdown_sender.send(()).ok();
    });

    let (notifier_actor, notifier_handle) = NotifierActor::new(
        Translator::new(config.language()),
        config.notifications.urgency.clone(),
    );
    tokio::spawn(notifier_actor.run());

    let data_file = config.data_file_path();
    info!(path = %data_file.display(), "study log location");
    let recorder = SessionRecorder::load(Arc::new(
        JsonLedgerStore::new(data_file).with_corrupt_backup(),
    ));

    let (timer_handle, timer_receiver) = TimerHandle::channel();
    let presenter = DesktopBreakPresenter::new(timer_handle.clone(), Some(notifier_handle.clone()));
    let sound = NotifierSound::new(notifier_handle.clone(), config.notifications.sound_enabled);

    let mut engine = TimerEngine::new(
        Arc::new(SystemClock),
        recorder,
        Arc::new(presenter),
        Arc::new(sound),
    )
    .with_pause_auto_resume(config.timer.pause_auto_resume());

    if let Some(media) = create_media_controller(&config) {
        engine = engine.with_media(media);
    }

    let timer_actor = TimerActor::new(
        timer_receiver,
        engine,
        Some(notifier_handle),
        Translator::new(config.language()),
        config.timer.tick_interval(),
    );
    tokio::spawn(timer_actor.run());

    let server = Server::new(timer_handle);
    server.run(shutdown_receiver).await?;

    info!("cadence daemon stopped");
    std::process::exit(0);
}

fn create_media_controller(config: &Config) -> Option<Arc<dyn MediaController>> {
    if !config.media.enabled {
        info!("media control disabled");
        return None;
    }

    match PlayerctlMediaController::detect(config.media.player.clone()) {
        Ok(controller) => {
            info!(player = ?config.media.player, "media control enabled");
            Some(Arc::new(controller))
        }
        Err(error) => {
            warn!(%error, "media control unavailable, breaks will not pause playback");
            None
        }
    }
}
