use tracing::{error, info};

use crate::{
    audio::{
        player::{PauseOutcome, ResumeOutcome, SkipOutcome, StartOutcome, StopOutcome},
        queue::{Removal, Track},
        session::{SessionBackend, VoiceDestination},
    },
    bot::state::MusicState,
    error::{PlaybackError, QueueError},
    sources::youtube::is_valid_track_url,
};

const JOIN_VOICE_FIRST: &str = "Join a voice channel first!";
const NOTHING_PLAYING: &str = "No audio is playing!";
const QUEUE_EMPTY: &str = "The queue is empty.";

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(Vec<String>),
    Stop,
    Pause,
    Resume,
    Skip,
    Queue,
    Shuffle,
    Clear(Vec<String>),
    Unknown(String),
}

impl Command {
    /// Parses `content` if it starts with `prefix`; other messages are not commands.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let body = content.strip_prefix(prefix)?;
        let mut tokens = body.split_whitespace();
        let name = tokens.next().unwrap_or_default().to_lowercase();
        let args: Vec<String> = tokens.map(str::to_string).collect();

        Some(match name.as_str() {
            "play" => Command::Play(args),
            "stop" => Command::Stop,
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "skip" => Command::Skip,
            "queue" => Command::Queue,
            "shuffle" => Command::Shuffle,
            "clear" => Command::Clear(args),
            _ => Command::Unknown(name),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Play(_) => "play",
            Command::Stop => "stop",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Skip => "skip",
            Command::Queue => "queue",
            Command::Shuffle => "shuffle",
            Command::Clear(_) => "clear",
            Command::Unknown(name) => name.as_str(),
        }
    }
}

/// Runs a command against the shared state and returns the replies to post.
///
/// `caller` is the voice channel the author is in, if any.
pub async fn dispatch<B: SessionBackend>(
    state: &mut MusicState<B>,
    command: Command,
    caller: Option<VoiceDestination>,
) -> Vec<String> {
    info!("📝 Command !{}", command.name());

    match command {
        Command::Play(args) => handle_play(state, args, caller).await,
        Command::Stop => match state.player.stop().await {
            StopOutcome::Stopped => vec!["Stopped playback!".to_string()],
            StopOutcome::NothingPlaying => vec![NOTHING_PLAYING.to_string()],
        },
        Command::Pause => match state.player.pause() {
            Ok(PauseOutcome::Paused) => vec!["Paused playback!".to_string()],
            Ok(PauseOutcome::NothingPlaying) => vec![NOTHING_PLAYING.to_string()],
            Err(e) => {
                error!("Error pausing: {}", e);
                vec!["Unable to pause playback.".to_string()]
            }
        },
        Command::Resume => handle_resume(state, caller).await,
        Command::Skip => handle_skip(state, caller).await,
        Command::Queue => vec![list_queue(state.queue.iter())],
        Command::Shuffle => {
            state.queue.shuffle();
            state.checkpoint().await;
            vec!["Queue shuffled!".to_string()]
        }
        Command::Clear(args) => handle_clear(state, args).await,
        Command::Unknown(_) => vec!["Unknown command!".to_string()],
    }
}

async fn handle_play<B: SessionBackend>(
    state: &mut MusicState<B>,
    args: Vec<String>,
    caller: Option<VoiceDestination>,
) -> Vec<String> {
    if args.is_empty() {
        return vec!["You need to provide a URL!".to_string()];
    }
    let Some(destination) = caller else {
        state.checkpoint().await;
        return vec![JOIN_VOICE_FIRST.to_string()];
    };

    let mut replies = Vec::new();
    let mut added = 0;
    for arg in args {
        let result = if is_valid_track_url(&arg) {
            state.queue.enqueue(Track::new(arg))
        } else {
            Err(QueueError::InvalidTrackReference(arg))
        };
        match result {
            Ok(_) => added += 1,
            Err(e) => replies.push(e.to_string()),
        }
    }

    replies.push(format!(
        "{} song(s) added to queue. Total now: {} song(s) in queue.",
        added,
        state.queue.len()
    ));

    if !state.player.is_playing() {
        let started = state.player.start(&mut state.queue, destination).await;
        start_replies(started, &mut replies);
    }

    state.checkpoint().await;
    replies
}

async fn handle_resume<B: SessionBackend>(
    state: &mut MusicState<B>,
    caller: Option<VoiceDestination>,
) -> Vec<String> {
    let mut replies = Vec::new();
    match state.player.resume(&mut state.queue, caller).await {
        Ok(ResumeOutcome::AlreadyPlaying) => replies.push("Audio is already playing!".to_string()),
        Ok(ResumeOutcome::NoDestination) => replies.push(JOIN_VOICE_FIRST.to_string()),
        Ok(ResumeOutcome::Started(outcome)) => {
            if outcome.is_playing() {
                replies.push("Resumed playback!".to_string());
            } else if outcome.skipped.is_empty() {
                replies.push(QUEUE_EMPTY.to_string());
            }
            start_replies(Ok(outcome), &mut replies);
            state.checkpoint().await;
        }
        Err(e) => start_replies(Err(e), &mut replies),
    }
    replies
}

async fn handle_skip<B: SessionBackend>(
    state: &mut MusicState<B>,
    caller: Option<VoiceDestination>,
) -> Vec<String> {
    let mut replies = Vec::new();
    match state.player.skip(&mut state.queue, caller).await {
        Ok(SkipOutcome::NoMoreTracks) => replies.push("No more tracks in the queue!".to_string()),
        Ok(SkipOutcome::NoDestination) => replies.push(JOIN_VOICE_FIRST.to_string()),
        Ok(SkipOutcome::Skipped(outcome)) => {
            replies.push("Skipped to the next track!".to_string());
            start_replies(Ok(outcome), &mut replies);
        }
        Err(e) => start_replies(Err(e), &mut replies),
    }
    state.checkpoint().await;
    replies
}

async fn handle_clear<B: SessionBackend>(state: &mut MusicState<B>, args: Vec<String>) -> Vec<String> {
    if args.is_empty() {
        state.queue.clear_all();
        state.checkpoint().await;
        return vec!["Queue cleared.".to_string()];
    }

    let mut replies = Vec::new();
    let mut positions = Vec::with_capacity(args.len());
    for arg in args {
        match arg.parse::<i64>() {
            Ok(position) => positions.push(position),
            Err(_) => replies.push(format!("{} is not a valid position in the queue.", arg)),
        }
    }

    for removal in state.queue.remove_many(positions) {
        if let Removal::OutOfRange(position) = removal {
            replies.push(QueueError::OutOfRange(position).to_string());
        }
    }
    replies.push("Selected songs removed from the queue.".to_string());

    state.checkpoint().await;
    replies
}

/// Renders the pending tracks as a numbered list.
pub fn list_queue<'a>(tracks: impl Iterator<Item = &'a Track>) -> String {
    let mut listing = String::from("Queue:\n");
    let mut any = false;
    for (index, track) in tracks.enumerate() {
        any = true;
        listing.push_str(&format!("{}. {}\n", index + 1, track));
    }

    if any {
        listing
    } else {
        QUEUE_EMPTY.to_string()
    }
}

fn start_replies(result: Result<StartOutcome, PlaybackError>, replies: &mut Vec<String>) {
    match result {
        Ok(outcome) => replies.extend(
            outcome
                .skipped
                .iter()
                .map(|track| format!("Unable to play {}, skipping...", track)),
        ),
        Err(e) => {
            error!("Error starting playback: {}", e);
            replies.push("Unable to join the voice channel.".to_string());
        }
    }
}
