use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::audio::queue::Track;

/// Durable copy of the track queue, stored as a JSON array of strings.
#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted queue.
    ///
    /// A missing or unreadable file means "start empty": the failure is logged
    /// and an empty snapshot is returned.
    pub async fn load(&self) -> Vec<Track> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("📂 No saved queue at {}, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("Error reading saved queue {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Track>>(&content) {
            Ok(tracks) => {
                info!("📂 Loaded {} queued tracks from {}", tracks.len(), self.path.display());
                tracks
            }
            Err(e) => {
                warn!("Saved queue {} is not valid JSON, ignoring it: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Replaces the persisted queue with `snapshot`.
    ///
    /// The new content goes to a temp file in the same directory which is then
    /// renamed over the old one, so a failed write leaves the previous copy intact.
    pub async fn save(&self, snapshot: &[Track]) -> Result<()> {
        let content = serde_json::to_vec(snapshot)?;
        let path = self.path.clone();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)
                .with_context(|| format!("creating temp file in {}", dir.display()))?;
            tmp.write_all(&content)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path)
                .with_context(|| format!("replacing {}", path.display()))?;
            Ok(())
        })
        .await??;

        debug!("💾 Saved {} queued tracks", snapshot.len());
        Ok(())
    }
}
