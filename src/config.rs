use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub startup_channel_id: u64,
    pub command_prefix: String,

    // Replies
    pub disable_embeds: bool,

    // Paths
    pub data_dir: PathBuf,
    pub queue_file: String,

    // Playback
    pub media_acquire_timeout: Option<Duration>,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Discord
            discord_token: std::env::var("DISCORD_TOKEN").context("DISCORD_TOKEN is not set")?,
            startup_channel_id: std::env::var("STARTUP_CHANNEL_ID")
                .context("STARTUP_CHANNEL_ID is not set")?
                .parse()
                .context("STARTUP_CHANNEL_ID must be a channel id")?,
            command_prefix: std::env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string()),

            disable_embeds: std::env::var("DISABLE_EMBEDS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("DISABLE_EMBEDS must be true or false")?,

            // Paths
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            queue_file: std::env::var("QUEUE_FILE").unwrap_or_else(|_| "queue.json".to_string()),

            // No timeout unless asked for, e.g. MEDIA_ACQUIRE_TIMEOUT=45s
            media_acquire_timeout: match std::env::var("MEDIA_ACQUIRE_TIMEOUT") {
                Ok(val) if !val.trim().is_empty() => Some(
                    humantime::parse_duration(val.trim())
                        .context("MEDIA_ACQUIRE_TIMEOUT must be a duration like 45s")?,
                ),
                _ => None,
            },
        };

        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("creating {}", config.data_dir.display()))?;

        Ok(config)
    }

    /// Rejects values the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.discord_token.trim().is_empty() {
            anyhow::bail!("Discord token must not be empty");
        }

        if self.startup_channel_id == 0 {
            anyhow::bail!("Startup channel id must be non-zero");
        }

        if self.command_prefix.trim().is_empty() {
            anyhow::bail!("Command prefix must not be empty");
        }

        if self.queue_file.is_empty() || self.queue_file.contains(&['/', '\\'][..]) {
            anyhow::bail!("Queue file must be a plain file name, got: {:?}", self.queue_file);
        }

        if self.media_acquire_timeout == Some(Duration::ZERO) {
            anyhow::bail!("Media acquire timeout must be greater than 0");
        }

        Ok(())
    }

    pub fn queue_path(&self) -> PathBuf {
        self.data_dir.join(&self.queue_file)
    }

    /// Loggable summary, without the token.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Discord: startup channel {}, prefix {:?}\n  \
            Replies: embeds {}\n  \
            Queue file: {}\n  \
            Media timeout: {}",
            self.startup_channel_id,
            self.command_prefix,
            if self.disable_embeds { "suppressed" } else { "allowed" },
            self.queue_path().display(),
            self.media_acquire_timeout
                .map_or("none".to_string(), |t| humantime::format_duration(t).to_string()),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Discord (no defaults - must be provided)
            discord_token: String::new(),
            startup_channel_id: 0,
            command_prefix: "!".to_string(),

            disable_embeds: true,

            data_dir: "./data".into(),
            queue_file: "queue.json".to_string(),

            media_acquire_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            discord_token: "token".to_string(),
            startup_channel_id: 1234,
            ..Config::default()
        }
    }

    #[test]
    fn defaults_need_credentials() {
        assert!(Config::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            Config { command_prefix: " ".into(), ..valid() },
            Config { queue_file: "../queue.json".into(), ..valid() },
            Config { queue_file: String::new(), ..valid() },
            Config { media_acquire_timeout: Some(Duration::ZERO), ..valid() },
            Config { startup_channel_id: 0, ..valid() },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn summary_hides_token() {
        let config = Config {
            discord_token: "super-secret".into(),
            media_acquire_timeout: Some(Duration::from_secs(45)),
            ..valid()
        };
        let summary = config.summary();

        assert!(!summary.contains("super-secret"));
        assert!(summary.contains("45s"));
        assert!(summary.contains("queue.json"));
    }
}
