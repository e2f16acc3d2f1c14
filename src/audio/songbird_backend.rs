use async_trait::async_trait;
use serenity::model::id::GuildId;
use songbird::{
    events::CoreEvent,
    input::{Input, YoutubeDl},
    tracks::TrackHandle,
    Call, Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    audio::{
        queue::Track,
        session::{SessionBackend, SessionEventKind, SessionEvents, VoiceDestination},
    },
    error::PlaybackError,
};

/// Voice connection for one guild plus the player currently bound to it.
pub struct SongbirdConnection {
    guild_id: GuildId,
    call: Arc<Mutex<Call>>,
    track: Option<TrackHandle>,
}

/// Session backend that joins voice through songbird and resolves tracks with yt-dlp.
pub struct SongbirdBackend {
    manager: Arc<Songbird>,
    http: reqwest::Client,
    acquire_timeout: Option<Duration>,
}

impl SongbirdBackend {
    pub fn new(manager: Arc<Songbird>, acquire_timeout: Option<Duration>) -> Self {
        Self {
            manager,
            http: reqwest::Client::new(),
            acquire_timeout,
        }
    }

    async fn resolve(&self, track: &Track) -> Result<Input, PlaybackError> {
        let mut input: Input = YoutubeDl::new(self.http.clone(), track.to_string()).into();

        // Forces yt-dlp to run now, so unavailable videos fail here instead of
        // inside the player.
        let metadata = input
            .aux_metadata()
            .await
            .map_err(|e| PlaybackError::MediaAcquisition {
                track: track.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            "🔍 Resolved {} ({})",
            track,
            metadata.title.as_deref().unwrap_or("untitled")
        );
        Ok(input)
    }
}

#[async_trait]
impl SessionBackend for SongbirdBackend {
    type Connection = SongbirdConnection;
    type Resource = Input;

    async fn connect(&self, destination: VoiceDestination) -> Result<SongbirdConnection, PlaybackError> {
        let call = self
            .manager
            .join(destination.guild_id, destination.channel_id)
            .await
            .map_err(|e| PlaybackError::Connection(e.to_string()))?;

        info!("🔊 Joined {}", destination);
        Ok(SongbirdConnection {
            guild_id: destination.guild_id,
            call,
            track: None,
        })
    }

    async fn acquire(&self, track: &Track) -> Result<Input, PlaybackError> {
        match self.acquire_timeout {
            Some(limit) => tokio::time::timeout(limit, self.resolve(track))
                .await
                .map_err(|_| PlaybackError::MediaAcquisition {
                    track: track.clone(),
                    reason: format!("timed out after {}", humantime::format_duration(limit)),
                })?,
            None => self.resolve(track).await,
        }
    }

    async fn play(
        &self,
        connection: &mut SongbirdConnection,
        resource: Input,
        events: SessionEvents,
    ) -> Result<(), PlaybackError> {
        let mut call = connection.call.lock().await;
        call.remove_all_global_events();

        let handle = call.play_only_input(resource);
        let bind = |event, kind| {
            handle
                .add_event(
                    Event::Track(event),
                    SessionSignal {
                        events: events.clone(),
                        kind,
                    },
                )
                .map_err(|e| PlaybackError::SessionRuntime(e.to_string()))
        };
        bind(TrackEvent::End, Signal::Idle)?;
        bind(TrackEvent::Error, Signal::Error)?;

        call.add_global_event(
            Event::Core(CoreEvent::DriverDisconnect),
            SessionSignal {
                events,
                kind: Signal::Disconnected,
            },
        );

        connection.track = Some(handle);
        Ok(())
    }

    fn pause(&self, connection: &SongbirdConnection) -> Result<(), PlaybackError> {
        match &connection.track {
            Some(track) => track
                .pause()
                .map_err(|e| PlaybackError::SessionRuntime(e.to_string())),
            None => Ok(()),
        }
    }

    async fn release(&self, connection: SongbirdConnection) {
        {
            let mut call = connection.call.lock().await;
            call.remove_all_global_events();
            call.stop();
        }

        if let Err(e) = self.manager.remove(connection.guild_id).await {
            warn!("Error leaving voice in guild {}: {:?}", connection.guild_id, e);
        } else {
            info!("👋 Left voice in guild {}", connection.guild_id);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Idle,
    Error,
    Disconnected,
}

/// Forwards a songbird event into the controller's event channel.
struct SessionSignal {
    events: SessionEvents,
    kind: Signal,
}

#[async_trait]
impl VoiceEventHandler for SessionSignal {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let kind = match self.kind {
            Signal::Idle => SessionEventKind::Idle,
            Signal::Error => {
                let reason = match ctx {
                    EventContext::Track(tracks) => tracks
                        .iter()
                        .map(|(state, _)| format!("{:?}", state.playing))
                        .collect::<Vec<_>>()
                        .join(", "),
                    _ => "unknown player error".to_string(),
                };
                SessionEventKind::Error(reason)
            }
            Signal::Disconnected => SessionEventKind::Disconnected,
        };

        debug!("📡 Session {} signalled {:?}", self.events.session(), kind);
        self.events.emit(kind);
        None
    }
}
