use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, warn};

use crate::{
    audio::{
        player::EventOutcome,
        session::{SessionBackend, SessionEvent},
    },
    bot::state::{MusicState, SharedState},
};

/// Feeds session events into the controller one at a time.
pub fn spawn_event_pump<B: SessionBackend>(
    state: SharedState<B>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let mut guard = state.lock().await;
            handle_event(&mut guard, event).await;
        }
        debug!("Session event channel closed");
    })
}

async fn handle_event<B: SessionBackend>(state: &mut MusicState<B>, event: SessionEvent) {
    match state.player.on_event(&mut state.queue, event).await {
        Ok(EventOutcome::Advanced(outcome)) => {
            for track in &outcome.skipped {
                warn!("⚠️ Unable to play {}, skipped", track);
            }
            state.checkpoint().await;
        }
        Ok(EventOutcome::Ended) | Ok(EventOutcome::Ignored) => {}
        Err(e) => {
            error!("❌ Error advancing queue: {}", e);
            state.checkpoint().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{
        player::PlaybackController,
        queue::{Track, TrackQueue},
        session::SessionEventKind,
        testing::{destination, FakeBackend},
    };
    use crate::storage::QueueStore;
    use pretty_assertions::assert_eq;
    use std::{sync::Arc, time::Duration};
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    async fn wait_for<F>(state: &SharedState<FakeBackend>, mut done: F)
    where
        F: FnMut(&MusicState<FakeBackend>) -> bool,
    {
        for _ in 0..100 {
            if done(&*state.lock().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn idle_signal_advances_and_checkpoints() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let (mut player, rx) = PlaybackController::new(backend.clone());
        let mut queue = TrackQueue::from_snapshot(vec![Track::from("a"), Track::from("b")]);
        player.start(&mut queue, destination(1)).await.unwrap();

        let store = QueueStore::new(dir.path().join("queue.json"));
        let state = Arc::new(Mutex::new(MusicState::new(queue, player, store.clone())));
        spawn_event_pump(state.clone(), rx);

        backend.emit_last(SessionEventKind::Idle);

        wait_for(&state, |s| s.player.now_playing() == Some(&Track::from("b"))).await;
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn disconnect_signal_keeps_queue() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let (mut player, rx) = PlaybackController::new(backend.clone());
        let mut queue = TrackQueue::from_snapshot(vec![Track::from("a"), Track::from("x")]);
        player.start(&mut queue, destination(1)).await.unwrap();

        let store = QueueStore::new(dir.path().join("queue.json"));
        let state = Arc::new(Mutex::new(MusicState::new(queue, player, store)));
        spawn_event_pump(state.clone(), rx);

        backend.emit_last(SessionEventKind::Disconnected);

        wait_for(&state, |s| s.player.now_playing().is_none()).await;
        let guard = state.lock().await;
        assert_eq!(guard.queue.snapshot(), vec![Track::from("x")]);
        assert_eq!(backend.open_connections(), 0);
    }
}
