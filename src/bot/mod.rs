//! # Bot Module
//!
//! Discord side of the queue bot.
//!
//! - [`QueueBot`] implements Serenity's [`EventHandler`]: it posts the startup
//!   notice, turns `!` messages into [`commands::Command`]s and sends the
//!   replies back.
//! - [`commands`] is the command router over the shared [`state::MusicState`].
//! - [`events`] pumps voice-session events into the playback controller.

use anyhow::Result;
use serenity::{
    all::{ChannelId, Context, EventHandler, GuildId, Message, Ready, UserId},
    async_trait,
    builder::{CreateAllowedMentions, CreateMessage},
};
use std::sync::Arc;
use tracing::{debug, error, info};

pub mod commands;
pub mod events;
pub mod state;

use crate::{
    audio::session::{SessionBackend, VoiceDestination},
    bot::{commands::Command, state::SharedState},
    config::Config,
    ui::messages,
};

/// Serenity event handler for the queue bot.
pub struct QueueBot<B: SessionBackend> {
    config: Arc<Config>,
    state: SharedState<B>,
}

impl<B: SessionBackend> QueueBot<B> {
    pub fn new(config: Arc<Config>, state: SharedState<B>) -> Self {
        Self { config, state }
    }

    /// Posts a reply, splitting it if needed. Mentions are never pinged.
    async fn send(&self, ctx: &Context, channel_id: ChannelId, content: &str) -> Result<()> {
        for body in messages::prepare_reply(content, self.config.disable_embeds) {
            channel_id
                .send_message(
                    &ctx.http,
                    CreateMessage::new()
                        .content(body)
                        .allowed_mentions(CreateAllowedMentions::new()),
                )
                .await?;
        }
        Ok(())
    }
}

/// Voice channel the user is currently connected to in this guild.
fn caller_destination(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<VoiceDestination> {
    let guild = ctx.cache.guild(guild_id)?;
    let channel_id = guild.voice_states.get(&user_id)?.channel_id?;
    Some(VoiceDestination::new(guild_id, channel_id))
}

#[async_trait]
impl<B: SessionBackend> EventHandler for QueueBot<B> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} is online!", ready.user.name);
        info!("📊 Connected to {} servers", ready.guilds.len());

        let channel_id = ChannelId::new(self.config.startup_channel_id);
        if let Err(e) = self.send(&ctx, channel_id, "Bot has started!").await {
            error!("Startup channel {} not reachable: {:?}", channel_id, e);
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else {
            return;
        };
        let Some(command) = Command::parse(&self.config.command_prefix, &msg.content) else {
            return;
        };

        debug!("Command from {} in guild {}: {:?}", msg.author.name, guild_id, command);
        let caller = caller_destination(&ctx, guild_id, msg.author.id);

        let replies = {
            let mut state = self.state.lock().await;
            commands::dispatch(&mut state, command, caller).await
        };

        for reply in replies {
            if let Err(e) = self.send(&ctx, msg.channel_id, &reply).await {
                error!("Error sending reply to {}: {:?}", msg.channel_id, e);
            }
        }
    }
}
