//! Mutation engine
//!
//! Owns the authoritative post collection ([`Feed`]) and the pure
//! [`reduce`] function that turns one [`Action`] into the next feed.

pub mod actions;
pub mod draft;
pub mod reducer;
pub mod state;

pub use actions::{Action, ReportTarget};
pub use draft::{DraftBody, PostDraft, ValidDraft};
pub use reducer::reduce;
pub use state::{Feed, Limits, Session, SocialGraph};
