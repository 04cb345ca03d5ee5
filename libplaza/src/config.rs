//! Configuration management for Plaza

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::types::{ActorId, Author};

/// Upper bound for `feed.event_capacity`
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// Upper bound for `feed.dedup_window`
pub const MAX_DEDUP_WINDOW: usize = 65_536;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub actor: ActorConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default)]
    pub polls: PollConfig,
}

/// The identity new posts, comments and reactions are attributed to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub id: String,
    pub name: String,
    pub role: String,
    pub avatar_initials: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Posts with more likes than this show up in the trending view
    pub trending_threshold: u32,
    /// Annotation placed before forwarded content
    pub forward_prefix: String,
    /// Creation label for content made in this session
    pub just_now_label: String,
    /// Per-subscriber buffer of the event bus
    pub event_capacity: usize,
    /// How many request ids `dispatch_once` remembers
    pub dedup_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub max_images: usize,
    pub max_poll_options: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// When false, an actor can vote at most once per poll
    pub allow_repeat_votes: bool,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            id: "local".to_string(),
            name: "Dr. Your Name".to_string(),
            role: "Specialist".to_string(),
            avatar_initials: "RT".to_string(),
            verified: false,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            trending_threshold: 50,
            forward_prefix: "Forwarded from".to_string(),
            just_now_label: "just now".to_string(),
            event_capacity: 100,
            dedup_window: 64,
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_images: 4,
            max_poll_options: 6,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            allow_repeat_votes: true,
        }
    }
}

impl ActorConfig {
    pub fn actor_id(&self) -> ActorId {
        ActorId::new(self.id.clone())
    }

    /// Author snapshot stamped onto content created by this actor
    pub fn author(&self) -> Author {
        Author {
            name: self.name.clone(),
            role: self.role.clone(),
            avatar_initials: self.avatar_initials.clone(),
            verified: self.verified,
            following: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load from the default location, falling back to defaults when no
    /// config file exists yet
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        if self.actor.id.trim().is_empty() {
            return Err(ConfigError::MissingField("actor.id".to_string()).into());
        }
        if self.actor.name.trim().is_empty() {
            return Err(ConfigError::MissingField("actor.name".to_string()).into());
        }
        check_bound("feed.event_capacity", self.feed.event_capacity, MAX_EVENT_CAPACITY)?;
        check_bound("feed.dedup_window", self.feed.dedup_window, MAX_DEDUP_WINDOW)?;
        Ok(())
    }
}

fn check_bound(field: &'static str, value: usize, max: usize) -> Result<()> {
    if value > max {
        return Err(ConfigError::OutOfRange { field, value, max }.into());
    }
    Ok(())
}

/// Resolve the configuration file path following the XDG Base Directory layout
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("PLAZA_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("plaza").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default_config();
        assert_eq!(config.feed.trending_threshold, 50);
        assert_eq!(config.composer.max_images, 4);
        assert_eq!(config.composer.max_poll_options, 6);
        assert!(config.polls.allow_repeat_votes);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [actor]
            id = "sarah"
            name = "Dr. Sarah Klein"

            [feed]
            trending_threshold = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.actor.id, "sarah");
        assert_eq!(config.actor.avatar_initials, "RT");
        assert_eq!(config.feed.trending_threshold, 10);
        assert_eq!(config.feed.forward_prefix, "Forwarded from");
    }

    #[test]
    fn test_empty_actor_id_rejected() {
        let result = Config::from_toml("[actor]\nid = \"  \"\n");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing required field: actor.id"));
    }

    #[test]
    fn test_oversized_buffers_rejected() {
        let error =
            Config::from_toml("[feed]\ndedup_window = 9223372036854775807\n").unwrap_err();
        assert_eq!(error.exit_code(), 1);
        assert_eq!(
            error.to_string(),
            "Configuration error: feed.dedup_window is 9223372036854775807, above the maximum of 65536"
        );

        let error = Config::from_toml("[feed]\nevent_capacity = 70000\n").unwrap_err();
        assert!(error.to_string().contains("feed.event_capacity is 70000"));

        let at_limit = Config::from_toml("[feed]\nevent_capacity = 65536\ndedup_window = 0\n");
        assert!(at_limit.is_ok());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = Config::from_toml("[feed\ntrending_threshold = 1");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config"));
    }

    #[test]
    fn test_actor_author_snapshot() {
        let actor = ActorConfig::default();
        let author = actor.author();
        assert_eq!(author.name, "Dr. Your Name");
        assert!(!author.following);
        assert_eq!(actor.actor_id(), ActorId::from("local"));
    }
}
