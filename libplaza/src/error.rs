//! Error types for Plaza
//!
//! Two layers live here. [`Rejection`] is the structured, always-recoverable
//! refusal the feed engine returns for expected validation and lookup
//! failures. [`PlazaError`] is the crate-level error for everything around
//! the engine (configuration, I/O, malformed input to the driver binaries).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CommentId, PostId};

pub type Result<T> = std::result::Result<T, PlazaError>;

#[derive(Error, Debug)]
pub enum PlazaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Action rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlazaError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PlazaError::InvalidInput(_) => 3,
            PlazaError::Rejected(_) => 2,
            PlazaError::Config(_) => 1,
            PlazaError::Io(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("{field} is {value}, above the maximum of {max}")]
    OutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

/// What a `not-found` rejection was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    Post { id: PostId },
    Comment { id: CommentId },
    /// A top-level comment was required but the id was missing or named a reply.
    TopLevelComment { id: CommentId },
    PollOption { post_id: PostId, index: usize },
    Event { post_id: PostId },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Post { id } => write!(f, "post {}", id),
            Target::Comment { id } => write!(f, "comment {}", id),
            Target::TopLevelComment { id } => write!(f, "top-level comment {}", id),
            Target::PollOption { post_id, index } => {
                write!(f, "poll option {} on post {}", index, post_id)
            }
            Target::Event { post_id } => write!(f, "event on post {}", post_id),
        }
    }
}

/// Broad class of a rejection, used by the façade to pick a user outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionClass {
    /// Surfaced to the user as an inline message
    Validation,
    /// Treated as a no-op and logged
    NotFound,
}

/// A structured refusal from the feed engine.
///
/// A rejected action never changes the feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("{0} cannot be empty")]
    EmptyContent(&'static str),

    #[error("A poll needs at least {required} non-empty options (found {found})")]
    InsufficientPollOptions { found: usize, required: usize },

    #[error("A poll can have at most {max} options (found {found})")]
    TooManyPollOptions { found: usize, max: usize },

    #[error("An event needs a {}", .0.join(" and a "))]
    MissingEventFields(Vec<&'static str>),

    #[error("Event date '{0}' is not a valid date")]
    InvalidEventDate(String),

    #[error("Already voted on the poll in post {0}")]
    AlreadyVoted(PostId),

    #[error("Event in post {0} is full")]
    EventFull(PostId),

    #[error("No free ids left in the feed")]
    IdsExhausted,

    #[error("Not found: {0}")]
    NotFound(Target),
}

impl Rejection {
    /// Stable machine-readable code for this rejection
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::EmptyContent(_) => "empty-content",
            Rejection::InsufficientPollOptions { .. } => "insufficient-poll-options",
            Rejection::TooManyPollOptions { .. } => "too-many-poll-options",
            Rejection::MissingEventFields(_) => "missing-event-fields",
            Rejection::InvalidEventDate(_) => "invalid-event-date",
            Rejection::AlreadyVoted(_) => "already-voted",
            Rejection::EventFull(_) => "event-full",
            Rejection::IdsExhausted => "ids-exhausted",
            Rejection::NotFound(_) => "not-found",
        }
    }

    pub fn class(&self) -> RejectionClass {
        match self {
            Rejection::NotFound(_) => RejectionClass::NotFound,
            _ => RejectionClass::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = PlazaError::InvalidInput("bad action line".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_rejected() {
        let error = PlazaError::Rejected(Rejection::EmptyContent("Content"));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_config_error() {
        let error = PlazaError::Config(ConfigError::MissingField("actor.id".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_rejection_kinds_are_stable() {
        assert_eq!(Rejection::EmptyContent("Content").kind(), "empty-content");
        assert_eq!(
            Rejection::InsufficientPollOptions { found: 1, required: 2 }.kind(),
            "insufficient-poll-options"
        );
        assert_eq!(
            Rejection::MissingEventFields(vec!["title"]).kind(),
            "missing-event-fields"
        );
        assert_eq!(
            Rejection::NotFound(Target::Post { id: PostId(1) }).kind(),
            "not-found"
        );
    }

    #[test]
    fn test_rejection_class() {
        assert_eq!(
            Rejection::NotFound(Target::Comment { id: CommentId(9) }).class(),
            RejectionClass::NotFound
        );
        assert_eq!(
            Rejection::EventFull(PostId(3)).class(),
            RejectionClass::Validation
        );
    }

    #[test]
    fn test_missing_event_fields_message() {
        let rejection = Rejection::MissingEventFields(vec!["title", "date"]);
        assert_eq!(rejection.to_string(), "An event needs a title and a date");
    }

    #[test]
    fn test_error_message_formatting_rejected() {
        let error: PlazaError = Rejection::NotFound(Target::PollOption {
            post_id: PostId(7),
            index: 4,
        })
        .into();
        assert_eq!(
            error.to_string(),
            "Action rejected: Not found: poll option 4 on post 7"
        );
    }

    #[test]
    fn test_config_error_read_error_formatting() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let config_error = ConfigError::ReadError(io_error);
        assert!(config_error.to_string().contains("Failed to read config file"));
    }
}
