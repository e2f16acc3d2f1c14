//! Error types for queue editing and playback.

use thiserror::Error;

use crate::audio::queue::Track;

/// Errors raised while validating queue input.
///
/// Both variants are reported back to the user as plain chat replies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The reference is not something that can be played.
    #[error("{0} is not a valid YouTube URL!")]
    InvalidTrackReference(String),

    /// A 1-based queue position outside `[1, len]`.
    #[error("{0} is not a valid position in the queue.")]
    OutOfRange(i64),
}

/// Errors raised by the voice/media collaborators during a session.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The media resource for a track could not be produced.
    #[error("could not acquire media for {track}: {reason}")]
    MediaAcquisition { track: Track, reason: String },

    /// The player or the connection failed while audio was playing.
    #[error("session runtime error: {0}")]
    SessionRuntime(String),

    /// The voice connection was lost without being asked to leave.
    #[error("voice connection disconnected")]
    Disconnected,

    /// The voice channel could not be joined.
    #[error("could not join voice channel: {0}")]
    Connection(String),
}
