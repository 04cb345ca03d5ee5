//! Pure reducer for feed mutations
//!
//! `(Feed, Session, Action) -> Result<(Feed, Change), Rejection>`
//!
//! The input feed is never modified. Work happens on a pointer-level copy,
//! and a rejection drops that copy, so an action either applies completely
//! or not at all. No I/O, no clock, no randomness: ids come from the feed's
//! own allocator.

use std::sync::Arc;

use tracing::{debug, info};

use super::actions::{Action, ReportTarget};
use super::draft::PostDraft;
use super::state::{Feed, Session};
use crate::error::{Rejection, Target};
use crate::events::Change;
use crate::types::{Comment, CommentId, Post, PostBody, PostId, Reactions, Reply};

/// Apply one action to the feed.
///
/// # Errors
///
/// Returns a [`Rejection`] when validation fails or the action names an id
/// that is not in the feed. The input feed is unchanged either way.
pub fn reduce(feed: &Feed, session: &Session, action: Action) -> Result<(Feed, Change), Rejection> {
    let mut next = feed.clone();

    let change = match action {
        Action::ToggleLike { post_id } => toggle_like(&mut next, session, post_id)?,
        Action::ToggleBookmark { post_id } => toggle_bookmark(&mut next, session, post_id)?,
        Action::ToggleFollow { post_id } => toggle_follow(&mut next, post_id)?,
        Action::FollowAuthor { name } => follow_author(&mut next, &name)?,
        Action::AddComment { post_id, text } => add_comment(&mut next, session, post_id, text)?,
        Action::AddReply {
            post_id,
            comment_id,
            text,
        } => add_reply(&mut next, session, post_id, comment_id, text)?,
        Action::ToggleCommentLike {
            comment_id,
            parent_id,
        } => toggle_comment_like(&mut next, session, comment_id, parent_id)?,
        Action::VotePoll {
            post_id,
            option_index,
        } => vote_poll(&mut next, session, post_id, option_index)?,
        Action::Repost { post_id } => repost(&mut next, session, post_id)?,
        Action::CreatePost { draft } => create_post(&mut next, session, &draft)?,
        Action::RemovePost { post_id } => remove_post(&mut next, post_id)?,
        Action::ToggleAttendance { post_id } => toggle_attendance(&mut next, session, post_id)?,
        Action::Report { target } => {
            // Reports leave the feed as it was
            let change = report(feed, target)?;
            return Ok((feed.clone(), change));
        }
    };

    next.bump_revision();
    Ok((next, change))
}

// ============================================================================
// Reactions
// ============================================================================

fn toggle_like(feed: &mut Feed, session: &Session, post_id: PostId) -> Result<Change, Rejection> {
    feed.update_post(post_id, |post| {
        let liked = post.likes.toggle(&session.actor);
        debug!(
            "{} post {} ({} likes)",
            if liked { "Liked" } else { "Unliked" },
            post_id,
            post.like_count()
        );
        Ok(())
    })?;
    Ok(Change::PostUpdated { post_id })
}

fn toggle_bookmark(
    feed: &mut Feed,
    session: &Session,
    post_id: PostId,
) -> Result<Change, Rejection> {
    feed.update_post(post_id, |post| {
        if !post.bookmarked_by.remove(&session.actor) {
            post.bookmarked_by.insert(session.actor.clone());
        }
        Ok(())
    })?;
    Ok(Change::PostUpdated { post_id })
}

/// Only this post's author snapshot changes; other posts by the same
/// author keep their own flag.
fn toggle_follow(feed: &mut Feed, post_id: PostId) -> Result<Change, Rejection> {
    feed.update_post(post_id, |post| {
        post.author.following = !post.author.following;
        Ok(())
    })?;
    Ok(Change::PostUpdated { post_id })
}

fn follow_author(feed: &mut Feed, name: &str) -> Result<Change, Rejection> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Rejection::EmptyContent("Author name"));
    }
    let following = feed.graph_mut().toggle(name);
    debug!("Social graph: following {} = {}", name, following);
    Ok(Change::AuthorFollowToggled {
        name: name.to_string(),
        following,
    })
}

// ============================================================================
// Comments
// ============================================================================

fn add_comment(
    feed: &mut Feed,
    session: &Session,
    post_id: PostId,
    text: String,
) -> Result<Change, Rejection> {
    let index = feed.position(post_id)?;
    if text.trim().is_empty() {
        return Err(Rejection::EmptyContent("Comment"));
    }

    let comment_id = CommentId(feed.allocate_id()?);
    let comment = Comment {
        id: comment_id,
        author: session.author.clone(),
        content: text,
        created_label: session.limits.just_now_label.clone(),
        likes: Reactions::default(),
        replies: Vec::new(),
    };

    feed.update_at(index, |post| {
        post.comments.push(Arc::new(comment));
        post.comment_count = post.comment_count.saturating_add(1);
        Ok(())
    })?;

    debug!("Added comment {} to post {}", comment_id, post_id);
    Ok(Change::CommentAdded {
        post_id,
        comment_id,
    })
}

/// Replies attach to top-level comments only and do not count towards the
/// post's comment tally.
fn add_reply(
    feed: &mut Feed,
    session: &Session,
    post_id: PostId,
    comment_id: CommentId,
    text: String,
) -> Result<Change, Rejection> {
    let index = feed.position(post_id)?;
    let comment_index = feed.posts()[index]
        .comments
        .iter()
        .position(|comment| comment.id == comment_id)
        .ok_or(Rejection::NotFound(Target::TopLevelComment { id: comment_id }))?;
    if text.trim().is_empty() {
        return Err(Rejection::EmptyContent("Reply"));
    }

    let reply_id = CommentId(feed.allocate_id()?);
    let reply = Reply {
        id: reply_id,
        author: session.author.clone(),
        content: text,
        created_label: session.limits.just_now_label.clone(),
        likes: Reactions::default(),
    };

    feed.update_at(index, |post| {
        Arc::make_mut(&mut post.comments[comment_index]).replies.push(reply);
        Ok(())
    })?;

    debug!("Added reply {} under comment {}", reply_id, comment_id);
    Ok(Change::ReplyAdded {
        post_id,
        comment_id,
        reply_id,
    })
}

fn toggle_comment_like(
    feed: &mut Feed,
    session: &Session,
    comment_id: CommentId,
    parent_id: Option<CommentId>,
) -> Result<Change, Rejection> {
    let not_found = Rejection::NotFound(Target::Comment { id: comment_id });
    let top_level_id = parent_id.unwrap_or(comment_id);
    let (index, comment_index) = feed
        .locate_top_level(top_level_id)
        .ok_or_else(|| not_found.clone())?;

    let post_id = feed.update_at(index, |post| {
        let comment = Arc::make_mut(&mut post.comments[comment_index]);
        match parent_id {
            None => {
                comment.likes.toggle(&session.actor);
            }
            Some(_) => {
                let reply = comment
                    .replies
                    .iter_mut()
                    .find(|reply| reply.id == comment_id)
                    .ok_or(not_found)?;
                reply.likes.toggle(&session.actor);
            }
        }
        Ok(post.id)
    })?;

    Ok(Change::CommentUpdated {
        post_id,
        comment_id,
    })
}

// ============================================================================
// Posts
// ============================================================================

/// Each call is one more vote unless repeat votes are disabled.
fn vote_poll(
    feed: &mut Feed,
    session: &Session,
    post_id: PostId,
    option_index: usize,
) -> Result<Change, Rejection> {
    let missing_option = Rejection::NotFound(Target::PollOption {
        post_id,
        index: option_index,
    });

    feed.update_post(post_id, |post| {
        let PostBody::Poll(poll) = &mut post.body else {
            return Err(missing_option);
        };
        if option_index >= poll.options.len() {
            return Err(missing_option);
        }
        if !session.limits.allow_repeat_votes && poll.has_voted(&session.actor) {
            return Err(Rejection::AlreadyVoted(post_id));
        }
        poll.options[option_index].record_vote(&session.actor);
        debug!(
            "Vote on post {} option {} ({} total)",
            post_id,
            option_index,
            poll.total_votes()
        );
        Ok(())
    })?;

    Ok(Change::PostUpdated { post_id })
}

/// Forward a post. The repost carries a frozen copy of the original taken
/// before its share count moves.
fn repost(feed: &mut Feed, session: &Session, post_id: PostId) -> Result<Change, Rejection> {
    let index = feed.position(post_id)?;
    let original = Arc::clone(&feed.posts()[index]);
    let repost_id = PostId(feed.allocate_id()?);

    let repost = Post {
        id: repost_id,
        author: session.author.clone(),
        content: format!(
            "{} {}:\n\n{}",
            session.limits.forward_prefix, original.author.name, original.content
        ),
        created_label: session.limits.just_now_label.clone(),
        body: original.body.clone(),
        tags: Default::default(),
        likes: Reactions::default(),
        bookmarked_by: Default::default(),
        comment_count: 0,
        comments: Vec::new(),
        share_count: 0,
        original: Some(Box::new(original.snapshot())),
    };

    feed.update_at(index, |post| {
        post.share_count = post.share_count.saturating_add(1);
        Ok(())
    })?;
    feed.prepend(repost);

    info!("Post {} forwarded as {}", post_id, repost_id);
    Ok(Change::PostReposted {
        original_id: post_id,
        repost_id,
    })
}

fn create_post(feed: &mut Feed, session: &Session, draft: &PostDraft) -> Result<Change, Rejection> {
    let valid = draft.validate(&session.limits)?;
    let post_id = PostId(feed.allocate_id()?);

    feed.prepend(Post {
        id: post_id,
        author: session.author.clone(),
        content: valid.content,
        created_label: session.limits.just_now_label.clone(),
        body: valid.body,
        tags: valid.tags,
        likes: Reactions::default(),
        bookmarked_by: Default::default(),
        comment_count: 0,
        comments: Vec::new(),
        share_count: 0,
        original: None,
    });

    info!("Created post {}", post_id);
    Ok(Change::PostCreated { post_id })
}

fn remove_post(feed: &mut Feed, post_id: PostId) -> Result<Change, Rejection> {
    let index = feed.position(post_id)?;
    feed.remove_at(index);
    info!("Removed post {}", post_id);
    Ok(Change::PostRemoved { post_id })
}

fn toggle_attendance(
    feed: &mut Feed,
    session: &Session,
    post_id: PostId,
) -> Result<Change, Rejection> {
    feed.update_post(post_id, |post| {
        let PostBody::Event(event) = &mut post.body else {
            return Err(Rejection::NotFound(Target::Event { post_id }));
        };
        if !event.attendees.contains(&session.actor) && event.is_full() {
            return Err(Rejection::EventFull(post_id));
        }
        event.attendees.toggle(&session.actor);
        Ok(())
    })?;
    Ok(Change::PostUpdated { post_id })
}

// ============================================================================
// Moderation
// ============================================================================

fn report(feed: &Feed, target: ReportTarget) -> Result<Change, Rejection> {
    let exists = match target {
        ReportTarget::Post { id } => feed.get(id).is_some(),
        ReportTarget::Comment { id } => feed.contains_comment(id),
    };
    if !exists {
        return Err(Rejection::NotFound(match target {
            ReportTarget::Post { id } => Target::Post { id },
            ReportTarget::Comment { id } => Target::Comment { id },
        }));
    }

    info!("Report filed for {:?}", target);
    Ok(Change::ReportFiled { target })
}
