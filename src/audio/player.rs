use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    audio::{
        queue::{Track, TrackQueue},
        session::{SessionBackend, SessionEvent, SessionEventKind, SessionEvents, SessionId, VoiceDestination},
    },
    error::PlaybackError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
    Stopped,
    Errored,
}

/// What a `start` attempt did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOutcome {
    /// Track now playing, `None` if the queue ran out.
    pub started: Option<Track>,
    /// Tracks dropped because their media could not be played.
    pub skipped: Vec<Track>,
}

impl StartOutcome {
    pub fn is_playing(&self) -> bool {
        self.started.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseOutcome {
    Paused,
    NothingPlaying,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NothingPlaying,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    AlreadyPlaying,
    NoDestination,
    Started(StartOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipOutcome {
    NoMoreTracks,
    NoDestination,
    Skipped(StartOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event belonged to a session that is already gone.
    Ignored,
    /// The session was torn down and nothing replaced it.
    Ended,
    /// The session was torn down and the next queued track was started.
    Advanced(StartOutcome),
}

struct ActiveSession<C> {
    id: SessionId,
    destination: VoiceDestination,
    track: Track,
    status: PlaybackStatus,
    connection: C,
}

/// Owns the single playback session and decides when the queue advances.
///
/// The queue itself is borrowed per call; the controller never keeps it.
pub struct PlaybackController<B: SessionBackend> {
    backend: B,
    session: Option<ActiveSession<B::Connection>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    next_session: u64,
}

impl<B: SessionBackend> PlaybackController<B> {
    /// Creates the controller together with the receiving end of its session events.
    pub fn new(backend: B) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            backend,
            session: None,
            events,
            next_session: 0,
        };
        (controller, rx)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.session
            .as_ref()
            .map_or(PlaybackStatus::Idle, |s| s.status)
    }

    pub fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }

    pub fn now_playing(&self) -> Option<&Track> {
        self.session.as_ref().map(|s| &s.track)
    }

    pub fn destination(&self) -> Option<VoiceDestination> {
        self.session.as_ref().map(|s| s.destination)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Plays the head of the queue into `destination`.
    ///
    /// With an empty queue nothing happens. Otherwise the current session is
    /// released first. Tracks whose media cannot be acquired or bound are
    /// dropped and the next one is tried until one plays or the queue runs out.
    pub async fn start(
        &mut self,
        queue: &mut TrackQueue,
        destination: VoiceDestination,
    ) -> Result<StartOutcome, PlaybackError> {
        let mut outcome = StartOutcome::default();

        while let Some(track) = queue.pop_next() {
            self.teardown(PlaybackStatus::Stopped).await;

            let mut connection = match self.backend.connect(destination).await {
                Ok(connection) => connection,
                Err(e) => {
                    error!("❌ Could not join {}: {}", destination, e);
                    queue.requeue_front(track);
                    return Err(e);
                }
            };

            let resource = match self.backend.acquire(&track).await {
                Ok(resource) => resource,
                Err(e) => {
                    warn!("⚠️ {}, skipping", e);
                    self.backend.release(connection).await;
                    outcome.skipped.push(track);
                    continue;
                }
            };

            let id = self.allocate_session_id();
            let events = SessionEvents::new(id, self.events.clone());
            if let Err(e) = self.backend.play(&mut connection, resource, events).await {
                warn!("⚠️ Could not start player for {}: {}, skipping", track, e);
                self.backend.release(connection).await;
                outcome.skipped.push(track);
                continue;
            }

            info!("🎵 Session {} playing {} in {}", id, track, destination);
            outcome.started = Some(track.clone());
            self.session = Some(ActiveSession {
                id,
                destination,
                track,
                status: PlaybackStatus::Playing,
                connection,
            });
            return Ok(outcome);
        }

        debug!("📭 Nothing left to play in {}", destination);
        Ok(outcome)
    }

    pub fn pause(&mut self) -> Result<PauseOutcome, PlaybackError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(PauseOutcome::NothingPlaying);
        };

        if session.status == PlaybackStatus::Playing {
            self.backend.pause(&session.connection)?;
            session.status = PlaybackStatus::Paused;
            info!("⏸️ Session {} paused", session.id);
        }
        Ok(PauseOutcome::Paused)
    }

    /// Restarts playback from the head of the queue unless already playing.
    ///
    /// A paused track is not continued; the paused session is replaced.
    pub async fn resume(
        &mut self,
        queue: &mut TrackQueue,
        caller: Option<VoiceDestination>,
    ) -> Result<ResumeOutcome, PlaybackError> {
        if self.is_playing() {
            return Ok(ResumeOutcome::AlreadyPlaying);
        }
        let Some(destination) = self.destination().or(caller) else {
            return Ok(ResumeOutcome::NoDestination);
        };
        Ok(ResumeOutcome::Started(self.start(queue, destination).await?))
    }

    pub async fn stop(&mut self) -> StopOutcome {
        if self.session.is_none() {
            return StopOutcome::NothingPlaying;
        }
        self.teardown(PlaybackStatus::Stopped).await;
        StopOutcome::Stopped
    }

    /// Moves on to the next queued track, in the current session's channel if
    /// there is one.
    pub async fn skip(
        &mut self,
        queue: &mut TrackQueue,
        caller: Option<VoiceDestination>,
    ) -> Result<SkipOutcome, PlaybackError> {
        if queue.is_empty() {
            return Ok(SkipOutcome::NoMoreTracks);
        }
        let Some(destination) = self.destination().or(caller) else {
            return Ok(SkipOutcome::NoDestination);
        };

        self.teardown(PlaybackStatus::Stopped).await;
        Ok(SkipOutcome::Skipped(self.start(queue, destination).await?))
    }

    /// Applies a lifecycle event from the backend.
    pub async fn on_event(
        &mut self,
        queue: &mut TrackQueue,
        event: SessionEvent,
    ) -> Result<EventOutcome, PlaybackError> {
        let Some(destination) = self
            .session
            .as_ref()
            .filter(|s| s.id == event.session)
            .map(|s| s.destination)
        else {
            debug!("Ignoring {:?} from stale session {}", event.kind, event.session);
            return Ok(EventOutcome::Ignored);
        };

        match event.kind {
            SessionEventKind::Idle => {
                debug!("Session {} finished its track", event.session);
                self.teardown(PlaybackStatus::Stopped).await;
            }
            SessionEventKind::Error(reason) => {
                error!("❌ Session {} failed: {}", event.session, PlaybackError::SessionRuntime(reason));
                self.teardown(PlaybackStatus::Errored).await;
            }
            SessionEventKind::Disconnected => {
                error!("🔌 Session {}: {}", event.session, PlaybackError::Disconnected);
                self.teardown(PlaybackStatus::Errored).await;
                return Ok(EventOutcome::Ended);
            }
        }

        if queue.is_empty() {
            info!("📭 Queue finished, leaving {}", destination);
            return Ok(EventOutcome::Ended);
        }
        Ok(EventOutcome::Advanced(self.start(queue, destination).await?))
    }

    async fn teardown(&mut self, status: PlaybackStatus) {
        if let Some(session) = self.session.take() {
            info!(
                "⏹️ Session {} ({}) ended as {:?}",
                session.id, session.track, status
            );
            self.backend.release(session.connection).await;
        }
    }

    fn allocate_session_id(&mut self) -> SessionId {
        self.next_session += 1;
        SessionId(self.next_session)
    }
}
