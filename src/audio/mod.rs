//! # Audio Module
//!
//! Queue and playback core of the bot.
//!
//! ### [`queue`] - Track Queue
//! - FIFO list of pending track references, 1-based positions for users
//! - Batch removal, uniform shuffle, snapshots for persistence
//!
//! ### [`player`] - Playback Controller
//! - Owns the single playback session
//! - Advances the queue on idle/error events, stops on disconnect
//!
//! ### [`session`] - Backend Seam
//! - [`session::SessionBackend`] abstracts joining voice and resolving media
//! - [`songbird_backend`] is the songbird + yt-dlp implementation

pub mod player;
pub mod queue;
pub mod session;
pub mod songbird_backend;

#[cfg(test)]
pub mod testing;
