//! Post drafts and their validation
//!
//! A draft is what the composer hands over on submit. Validation either
//! produces a normalized [`ValidDraft`] or a [`Rejection`]; nothing is
//! stored until it passes.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::state::Limits;
use crate::error::Rejection;
use crate::types::{EventDetails, MediaRef, Poll, PollOption, PostBody, Reactions};

/// Minimum number of non-blank options a poll needs
pub const MIN_POLL_OPTIONS: usize = 2;

/// Date formats accepted for event dates
const EVENT_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub body: DraftBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftBody {
    #[default]
    Text,
    Image {
        media: Vec<MediaRef>,
    },
    Video {
        media: MediaRef,
    },
    Poll {
        question: String,
        options: Vec<String>,
    },
    Event {
        title: String,
        date: String,
        #[serde(default)]
        location: Option<String>,
        #[serde(default)]
        capacity: Option<u32>,
    },
}

/// A draft that passed validation, ready to become a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub content: String,
    pub tags: BTreeSet<String>,
    pub body: PostBody,
}

impl PostDraft {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn poll(question: impl Into<String>, options: &[&str]) -> Self {
        Self {
            body: DraftBody::Poll {
                question: question.into(),
                options: options.iter().map(|option| option.to_string()).collect(),
            },
            ..Self::default()
        }
    }

    pub fn event(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            body: DraftBody::Event {
                title: title.into(),
                date: date.into(),
                location: None,
                capacity: None,
            },
            ..Self::default()
        }
    }

    pub fn images(content: impl Into<String>, media: Vec<MediaRef>) -> Self {
        Self {
            content: content.into(),
            body: DraftBody::Image { media },
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    /// Check the draft against the rules for its kind.
    ///
    /// - text: content must not be blank
    /// - poll: question must not be blank; between [`MIN_POLL_OPTIONS`] and
    ///   `limits.max_poll_options` non-blank options (blank ones are dropped)
    /// - event: title and date are required and the date must parse
    /// - image: extra media beyond `limits.max_images` is dropped
    ///
    /// Tags are trimmed and de-duplicated for every kind.
    pub fn validate(&self, limits: &Limits) -> Result<ValidDraft, Rejection> {
        let body = match &self.body {
            DraftBody::Text => {
                if self.content.trim().is_empty() {
                    return Err(Rejection::EmptyContent("Content"));
                }
                PostBody::Text
            }
            DraftBody::Image { media } => {
                if media.len() > limits.max_images {
                    tracing::debug!(
                        "Dropping {} images over the limit of {}",
                        media.len() - limits.max_images,
                        limits.max_images
                    );
                }
                PostBody::Image {
                    media: media.iter().take(limits.max_images).cloned().collect(),
                }
            }
            DraftBody::Video { media } => PostBody::Video {
                media: media.clone(),
            },
            DraftBody::Poll { question, options } => {
                PostBody::Poll(validate_poll(question, options, limits)?)
            }
            DraftBody::Event {
                title,
                date,
                location,
                capacity,
            } => PostBody::Event(validate_event(title, date, location.as_deref(), *capacity)?),
        };

        Ok(ValidDraft {
            content: self.content.clone(),
            tags: normalize_tags(&self.tags),
            body,
        })
    }
}

fn validate_poll(question: &str, options: &[String], limits: &Limits) -> Result<Poll, Rejection> {
    if question.trim().is_empty() {
        return Err(Rejection::EmptyContent("Poll question"));
    }

    let options: Vec<PollOption> = options
        .iter()
        .map(|option| option.trim())
        .filter(|option| !option.is_empty())
        .map(PollOption::new)
        .collect();

    if options.len() < MIN_POLL_OPTIONS {
        return Err(Rejection::InsufficientPollOptions {
            found: options.len(),
            required: MIN_POLL_OPTIONS,
        });
    }
    if options.len() > limits.max_poll_options {
        return Err(Rejection::TooManyPollOptions {
            found: options.len(),
            max: limits.max_poll_options,
        });
    }

    Ok(Poll {
        question: question.trim().to_string(),
        options,
    })
}

fn validate_event(
    title: &str,
    date: &str,
    location: Option<&str>,
    capacity: Option<u32>,
) -> Result<EventDetails, Rejection> {
    let mut missing = Vec::new();
    if title.trim().is_empty() {
        missing.push("title");
    }
    if date.trim().is_empty() {
        missing.push("date");
    }
    if !missing.is_empty() {
        return Err(Rejection::MissingEventFields(missing));
    }

    let datetime = parse_event_date(date.trim())
        .ok_or_else(|| Rejection::InvalidEventDate(date.trim().to_string()))?;

    Ok(EventDetails {
        title: title.trim().to_string(),
        datetime,
        location: location
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .map(str::to_string),
        attendees: Reactions::default(),
        capacity,
    })
}

/// Accepts a bare date (midnight) or a date with a time
pub fn parse_event_date(date: &str) -> Option<NaiveDateTime> {
    EVENT_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
        })
}

fn normalize_tags(tags: &[String]) -> BTreeSet<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
