//! Actor-relative post snapshots for rendering
//!
//! A [`PostCard`] is the flat shape the rendering layer consumes: counts are
//! resolved, `liked`/`bookmarked` are answered for one actor, and poll
//! percentages are computed.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::poll::{attendance_rate, percentage};
use crate::feed::SocialGraph;
use crate::types::{ActorId, Author, Comment, Post, PostBody, PostId, PostKind, PostSnapshot, Reply};
use crate::types::{CommentId, MediaRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCard {
    pub id: PostId,
    pub author: Author,
    /// Embedded flag or live social-graph follow
    pub author_followed: bool,
    pub content: String,
    pub kind: PostKind,
    pub created_label: String,
    pub like_count: u32,
    pub liked: bool,
    pub bookmarked: bool,
    pub comment_count: u32,
    pub share_count: u32,
    pub tags: Vec<String>,
    pub media: Vec<MediaRef>,
    pub poll: Option<PollView>,
    pub event: Option<EventView>,
    pub original: Option<PostSnapshot>,
    pub comments: Vec<CommentCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollView {
    pub question: String,
    pub total_votes: u32,
    pub voted: bool,
    pub options: Vec<PollOptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOptionView {
    pub text: String,
    pub votes: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub title: String,
    pub datetime: NaiveDateTime,
    pub location: Option<String>,
    pub attendees: u32,
    pub capacity: Option<u32>,
    pub attending: bool,
    pub attendance_rate: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentCard {
    pub id: CommentId,
    pub author: Author,
    pub content: String,
    pub created_label: String,
    pub like_count: u32,
    pub liked: bool,
    /// Always empty on replies
    pub replies: Vec<CommentCard>,
}

pub fn post_card(post: &Post, actor: &ActorId, graph: &SocialGraph) -> PostCard {
    let (media, poll, event) = match &post.body {
        PostBody::Text => (Vec::new(), None, None),
        PostBody::Image { media } => (media.clone(), None, None),
        PostBody::Video { media } => (vec![media.clone()], None, None),
        PostBody::Poll(poll) => {
            let total_votes = poll.total_votes();
            let view = PollView {
                question: poll.question.clone(),
                total_votes,
                voted: poll.has_voted(actor),
                options: poll
                    .options
                    .iter()
                    .map(|option| PollOptionView {
                        text: option.text.clone(),
                        votes: option.vote_count(),
                        percentage: percentage(option.vote_count(), total_votes),
                    })
                    .collect(),
            };
            (Vec::new(), Some(view), None)
        }
        PostBody::Event(event) => {
            let view = EventView {
                title: event.title.clone(),
                datetime: event.datetime,
                location: event.location.clone(),
                attendees: event.attendees.count(),
                capacity: event.capacity,
                attending: event.attendees.contains(actor),
                attendance_rate: attendance_rate(event),
            };
            (Vec::new(), None, Some(view))
        }
    };

    PostCard {
        id: post.id,
        author: post.author.clone(),
        author_followed: post.author.following || graph.follows(&post.author.name),
        content: post.content.clone(),
        kind: post.kind(),
        created_label: post.created_label.clone(),
        like_count: post.like_count(),
        liked: post.is_liked_by(actor),
        bookmarked: post.is_bookmarked_by(actor),
        comment_count: post.comment_count,
        share_count: post.share_count,
        tags: post.tags.iter().cloned().collect(),
        media,
        poll,
        event,
        original: post.original.as_deref().cloned(),
        comments: post
            .comments
            .iter()
            .map(|comment| comment_card(comment, actor))
            .collect(),
    }
}

fn comment_card(comment: &Comment, actor: &ActorId) -> CommentCard {
    CommentCard {
        id: comment.id,
        author: comment.author.clone(),
        content: comment.content.clone(),
        created_label: comment.created_label.clone(),
        like_count: comment.likes.count(),
        liked: comment.likes.contains(actor),
        replies: comment
            .replies
            .iter()
            .map(|reply| reply_card(reply, actor))
            .collect(),
    }
}

fn reply_card(reply: &Reply, actor: &ActorId) -> CommentCard {
    CommentCard {
        id: reply.id,
        author: reply.author.clone(),
        content: reply.content.clone(),
        created_label: reply.created_label.clone(),
        like_count: reply.likes.count(),
        liked: reply.likes.contains(actor),
        replies: Vec::new(),
    }
}
