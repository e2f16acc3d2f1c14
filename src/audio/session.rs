use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::fmt;
use tokio::sync::mpsc;

use crate::{audio::queue::Track, error::PlaybackError};

/// Where audio is played: one voice channel in one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceDestination {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
}

impl VoiceDestination {
    pub fn new(guild_id: GuildId, channel_id: ChannelId) -> Self {
        Self {
            guild_id,
            channel_id,
        }
    }
}

impl fmt::Display for VoiceDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guild {} / channel {}", self.guild_id, self.channel_id)
    }
}

/// Identifies one playback session. Events carrying an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    /// The player reached the natural end of the track.
    Idle,
    /// The player or the connection reported a runtime failure.
    Error(String),
    /// The connection dropped without being asked to.
    Disconnected,
}

/// Lifecycle signal emitted by a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub kind: SessionEventKind,
}

/// Sender half handed to the backend so a session can report its lifecycle.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    session: SessionId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionEvents {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Delivers an event. A closed channel means the bot is shutting down.
    pub fn emit(&self, kind: SessionEventKind) {
        let _ = self.tx.send(SessionEvent {
            session: self.session,
            kind,
        });
    }
}

/// Voice-session and media-resolution collaborators used by the playback controller.
///
/// `connect`, `acquire` and `play` are the three steps of opening a session;
/// `release` undoes `connect` (and any player bound by `play`).
#[async_trait]
pub trait SessionBackend: Send + Sync + 'static {
    type Connection: Send + Sync;
    type Resource: Send;

    /// Joins the destination voice channel.
    async fn connect(&self, destination: VoiceDestination) -> Result<Self::Connection, PlaybackError>;

    /// Produces an audio-only resource for `track`.
    async fn acquire(&self, track: &Track) -> Result<Self::Resource, PlaybackError>;

    /// Binds a player for `resource` to the connection and routes its
    /// lifecycle signals into `events`.
    async fn play(
        &self,
        connection: &mut Self::Connection,
        resource: Self::Resource,
        events: SessionEvents,
    ) -> Result<(), PlaybackError>;

    fn pause(&self, connection: &Self::Connection) -> Result<(), PlaybackError>;

    /// Stops the player and leaves the voice channel.
    async fn release(&self, connection: Self::Connection);
}
