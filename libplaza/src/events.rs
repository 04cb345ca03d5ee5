//! Feed change notifications
//!
//! The reducer describes what it did as a [`Change`]. The façade wraps each
//! applied change in an [`Event`] and publishes it on an [`EventBus`] so
//! every surface looking at the feed (timeline, community page, comment
//! panel, cached projections) can refresh from the same revision.
//!
//! The bus is a `tokio::sync::broadcast` channel. Emitting never blocks: with
//! no subscribers the event is dropped, and a lagging subscriber loses the
//! oldest events first.
//!
//! ```
//! use libplaza::events::{Change, Event, EventBus};
//! use libplaza::types::PostId;
//!
//! let bus = EventBus::new(16);
//! let mut receiver = bus.subscribe();
//!
//! bus.emit(Event::FeedChanged {
//!     revision: 1,
//!     change: Change::PostUpdated { post_id: PostId(1) },
//! });
//!
//! assert!(matches!(receiver.try_recv(), Ok(Event::FeedChanged { revision: 1, .. })));
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::MAX_EVENT_CAPACITY;
use crate::feed::ReportTarget;
use crate::types::{CommentId, PostId};

pub type EventReceiver = broadcast::Receiver<Event>;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// `capacity` is the per-subscriber buffer, clamped to
    /// `1..=MAX_EVENT_CAPACITY`
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: Event) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// What one applied action did to the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    PostCreated {
        post_id: PostId,
    },
    /// Reactions, follow flag, poll tally or attendance changed
    PostUpdated {
        post_id: PostId,
    },
    PostRemoved {
        post_id: PostId,
    },
    CommentAdded {
        post_id: PostId,
        comment_id: CommentId,
    },
    ReplyAdded {
        post_id: PostId,
        comment_id: CommentId,
        reply_id: CommentId,
    },
    CommentUpdated {
        post_id: PostId,
        comment_id: CommentId,
    },
    PostReposted {
        original_id: PostId,
        repost_id: PostId,
    },
    AuthorFollowToggled {
        name: String,
        following: bool,
    },
    /// Nothing in the feed changes
    ReportFiled {
        target: ReportTarget,
    },
}

impl Change {
    /// The post this change touched, if any
    pub fn post_id(&self) -> Option<PostId> {
        match self {
            Change::PostCreated { post_id }
            | Change::PostUpdated { post_id }
            | Change::PostRemoved { post_id }
            | Change::CommentAdded { post_id, .. }
            | Change::ReplyAdded { post_id, .. }
            | Change::CommentUpdated { post_id, .. } => Some(*post_id),
            Change::PostReposted { repost_id, .. } => Some(*repost_id),
            Change::AuthorFollowToggled { .. } => None,
            Change::ReportFiled {
                target: ReportTarget::Post { id },
            } => Some(*id),
            Change::ReportFiled { .. } => None,
        }
    }

    /// Whether the feed contents changed (and the revision moved)
    pub fn is_structural(&self) -> bool {
        !matches!(self, Change::ReportFiled { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An action was applied; `revision` is the feed revision afterwards
    FeedChanged { revision: u64, change: Change },

    /// A report was filed for moderation. Reports leave the feed as it
    /// was, so `revision` is the current one.
    ReportFiled { revision: u64, target: ReportTarget },

    /// An action was refused with a validation message
    ActionRejected {
        action: String,
        kind: String,
        message: String,
    },
}
