//! In-memory session backend for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId};
use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, AtomicIsize, Ordering},
    Arc,
};

use crate::{
    audio::{
        queue::Track,
        session::{SessionBackend, SessionEventKind, SessionEvents, VoiceDestination},
    },
    error::PlaybackError,
};

pub fn destination(channel: u64) -> VoiceDestination {
    VoiceDestination::new(GuildId::new(42), ChannelId::new(channel))
}

#[derive(Default)]
struct Inner {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    refuse_connections: AtomicBool,
    open: AtomicIsize,
    last_events: Mutex<Option<SessionEvents>>,
}

/// Records every call and fails acquisition for selected tracks.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Inner>,
}

pub struct FakeConnection {
    channel: u64,
}

impl FakeBackend {
    pub fn failing(tracks: &[&str]) -> Self {
        let backend = Self::default();
        backend
            .inner
            .failing
            .lock()
            .extend(tracks.iter().map(|t| t.to_string()));
        backend
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.inner.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().clone()
    }

    /// Connections opened and not yet released.
    pub fn open_connections(&self) -> isize {
        self.inner.open.load(Ordering::SeqCst)
    }

    /// Emits an event as the most recently bound player would.
    pub fn emit_last(&self, kind: SessionEventKind) {
        if let Some(events) = self.inner.last_events.lock().as_ref() {
            events.emit(kind);
        }
    }

    fn record(&self, call: String) {
        self.inner.calls.lock().push(call);
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    type Connection = FakeConnection;
    type Resource = Track;

    async fn connect(&self, destination: VoiceDestination) -> Result<FakeConnection, PlaybackError> {
        if self.inner.refuse_connections.load(Ordering::SeqCst) {
            return Err(PlaybackError::Connection("refused".into()));
        }
        let channel = destination.channel_id.get();
        self.record(format!("connect {}", channel));
        self.inner.open.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection { channel })
    }

    async fn acquire(&self, track: &Track) -> Result<Track, PlaybackError> {
        self.record(format!("acquire {}", track));
        if self.inner.failing.lock().contains(track.as_str()) {
            return Err(PlaybackError::MediaAcquisition {
                track: track.clone(),
                reason: "video unavailable".into(),
            });
        }
        Ok(track.clone())
    }

    async fn play(
        &self,
        _connection: &mut FakeConnection,
        resource: Track,
        events: SessionEvents,
    ) -> Result<(), PlaybackError> {
        self.record(format!("play {}", resource));
        *self.inner.last_events.lock() = Some(events);
        Ok(())
    }

    fn pause(&self, connection: &FakeConnection) -> Result<(), PlaybackError> {
        self.record(format!("pause {}", connection.channel));
        Ok(())
    }

    async fn release(&self, connection: FakeConnection) {
        self.record(format!("release {}", connection.channel));
        self.inner.open.fetch_sub(1, Ordering::SeqCst);
    }
}
