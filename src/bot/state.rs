use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

use crate::{
    audio::{player::PlaybackController, queue::TrackQueue, session::SessionBackend},
    storage::QueueStore,
};

/// Everything the command router and the event pump operate on.
///
/// Held behind a single mutex so commands and session events never interleave.
pub struct MusicState<B: SessionBackend> {
    pub queue: TrackQueue,
    pub player: PlaybackController<B>,
    pub store: QueueStore,
}

pub type SharedState<B> = Arc<Mutex<MusicState<B>>>;

impl<B: SessionBackend> MusicState<B> {
    pub fn new(queue: TrackQueue, player: PlaybackController<B>, store: QueueStore) -> Self {
        Self {
            queue,
            player,
            store,
        }
    }

    /// Persists the queue. Failures are logged, never propagated.
    pub async fn checkpoint(&self) {
        if let Err(e) = self.store.save(&self.queue.snapshot()).await {
            error!(
                "❌ Error saving queue to {}: {:?}",
                self.store.path().display(),
                e
            );
        }
    }
}
