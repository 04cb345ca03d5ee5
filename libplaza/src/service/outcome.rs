//! What a dispatched action came to

use serde::Serialize;

use crate::error::Rejection;
use crate::events::Event;

/// User-facing message for a refused action, shown inline by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Stable machine-readable code, e.g. `empty-content`
    pub kind: &'static str,
    pub message: String,
}

impl From<&Rejection> for Notice {
    fn from(rejection: &Rejection) -> Self {
        Self {
            kind: rejection.kind(),
            message: rejection.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action was applied and this event was published
    Applied(Event),
    /// Validation failed; show [`Outcome::notice`] to the user
    Rejected(Rejection),
    /// The target no longer exists; nothing happened
    Ignored(Rejection),
    /// The request id was already dispatched
    Duplicate,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    /// The user-facing message for a validation rejection
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Outcome::Rejected(rejection) => Some(Notice::from(rejection)),
            _ => None,
        }
    }

    /// Short label for logs and the replay driver
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Applied(_) => "applied",
            Outcome::Rejected(_) => "rejected",
            Outcome::Ignored(_) => "ignored",
            Outcome::Duplicate => "duplicate",
        }
    }
}
