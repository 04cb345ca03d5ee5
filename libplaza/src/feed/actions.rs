//! Actions for the feed reducer
//!
//! Every change to the feed is described by one of these values. They are
//! plain data: the reducer (see `reducer.rs`) decides what they do.

use serde::{Deserialize, Serialize};

use super::draft::PostDraft;
use crate::types::{CommentId, PostId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    // === Reactions ===
    ToggleLike {
        post_id: PostId,
    },

    ToggleBookmark {
        post_id: PostId,
    },

    /// Flip `following` on this post's embedded author snapshot only
    ToggleFollow {
        post_id: PostId,
    },

    /// Flip the live social-graph entry for an author name
    FollowAuthor {
        name: String,
    },

    // === Comments ===
    AddComment {
        post_id: PostId,
        text: String,
    },

    /// `comment_id` must name a top-level comment
    AddReply {
        post_id: PostId,
        comment_id: CommentId,
        text: String,
    },

    /// `parent_id` is set when `comment_id` is a reply
    ToggleCommentLike {
        comment_id: CommentId,
        #[serde(default)]
        parent_id: Option<CommentId>,
    },

    // === Posts ===
    VotePoll {
        post_id: PostId,
        option_index: usize,
    },

    Repost {
        post_id: PostId,
    },

    CreatePost {
        draft: PostDraft,
    },

    RemovePost {
        post_id: PostId,
    },

    ToggleAttendance {
        post_id: PostId,
    },

    // === Moderation ===
    Report {
        target: ReportTarget,
    },
}

impl Action {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::ToggleLike { .. } => "toggle_like",
            Action::ToggleBookmark { .. } => "toggle_bookmark",
            Action::ToggleFollow { .. } => "toggle_follow",
            Action::FollowAuthor { .. } => "follow_author",
            Action::AddComment { .. } => "add_comment",
            Action::AddReply { .. } => "add_reply",
            Action::ToggleCommentLike { .. } => "toggle_comment_like",
            Action::VotePoll { .. } => "vote_poll",
            Action::Repost { .. } => "repost",
            Action::CreatePost { .. } => "create_post",
            Action::RemovePost { .. } => "remove_post",
            Action::ToggleAttendance { .. } => "toggle_attendance",
            Action::Report { .. } => "report",
        }
    }
}

/// Something a user can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportTarget {
    Post { id: PostId },
    Comment { id: CommentId },
}
