use anyhow::Result;
use serenity::{model::gateway::GatewayIntents, Client};
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

mod audio;
mod bot;
mod config;
mod error;
mod sources;
mod storage;
mod ui;

use crate::audio::{player::PlaybackController, queue::TrackQueue, songbird_backend::SongbirdBackend};
use crate::bot::{events::spawn_event_pump, state::MusicState, QueueBot};
use crate::config::Config;
use crate::storage::QueueStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("queue_bot=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("🎵 Starting queue bot v{}", env!("CARGO_PKG_VERSION"));

    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check().await;
    }

    let config = Arc::new(Config::load()?);
    info!("{}", config.summary());

    // Restore the queue left over from the last run
    let store = QueueStore::new(config.queue_path());
    let queue = TrackQueue::from_snapshot(store.load().await);

    let songbird = Songbird::serenity();
    let backend = SongbirdBackend::new(songbird.clone(), config.media_acquire_timeout);
    let (player, session_events) = PlaybackController::new(backend);

    let state = Arc::new(Mutex::new(MusicState::new(queue, player, store)));
    spawn_event_pump(state.clone(), session_events);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = QueueBot::new(config.clone(), state);
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("⚠️ Shutdown signal received, closing...");
            shard_manager.shutdown_all().await;
        }
    });

    info!("🚀 Bot started");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}

/// `--health-check`: succeeds when yt-dlp can be run.
async fn health_check() -> Result<()> {
    let yt_dlp = async_process::Command::new("yt-dlp")
        .arg("--version")
        .output()
        .await?;

    if yt_dlp.status.success() {
        println!("OK");
        Ok(())
    } else {
        anyhow::bail!("yt-dlp is missing or broken");
    }
}
