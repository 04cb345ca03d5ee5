//! Plaza - feed interaction engine for a professional community
//!
//! This library owns the in-memory feed of posts, comments, polls and
//! events, applies every user action to it through a pure reducer, and
//! computes the read-only views the rendering layer displays.

pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod logging;
pub mod service;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use config::Config;
pub use error::{PlazaError, Rejection, Result};
pub use feed::{Action, Feed, PostDraft};
pub use service::{FeedService, Outcome};
pub use types::{ActorId, Post, PostId};
