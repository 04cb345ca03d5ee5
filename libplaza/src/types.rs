//! Core entity model for Plaza
//!
//! Authors are embedded as snapshots: a post or comment keeps the identity
//! it was written under, and later profile changes do not reach back into
//! already-authored content. Live follow state lives in
//! [`crate::feed::SocialGraph`] instead.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The person acting on the feed (the "current user" of a session)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to already-resolved media (URL or blob handle)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

impl From<&str> for MediaRef {
    fn from(reference: &str) -> Self {
        Self(reference.to_string())
    }
}

// ============================================================================
// Authors and reactions
// ============================================================================

/// Identity snapshot attached to a post or comment at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub role: String,
    pub avatar_initials: String,
    #[serde(default)]
    pub verified: bool,
    /// Viewer-relative follow flag carried on this snapshot only
    #[serde(default)]
    pub following: bool,
}

impl Author {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        avatar_initials: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            avatar_initials: avatar_initials.into(),
            verified: false,
            following: false,
        }
    }

    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }
}

/// A counter backed by the set of actors who contributed to it.
///
/// `seeded` holds reactions that predate actor tracking (imported counts).
/// The visible count is `seeded + by.len()`, so it can never go negative and
/// an actor in `by` is always counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    #[serde(default)]
    pub seeded: u32,
    #[serde(default)]
    pub by: BTreeSet<ActorId>,
}

impl Reactions {
    /// Build from a legacy `(count, liked)` pair.
    ///
    /// A pair claiming the actor reacted while the count is zero is clamped:
    /// the actor's reaction becomes the only one counted.
    pub fn seeded(count: u32, reacted_by: Option<ActorId>) -> Self {
        let mut by = BTreeSet::new();
        let seeded = match reacted_by {
            Some(actor) => {
                if count == 0 {
                    tracing::debug!(actor = %actor, "clamping reaction seeded at zero");
                }
                by.insert(actor);
                count.saturating_sub(1)
            }
            None => count,
        };
        Self { seeded, by }
    }

    pub fn count(&self) -> u32 {
        let tracked = u32::try_from(self.by.len()).unwrap_or(u32::MAX);
        self.seeded.saturating_add(tracked)
    }

    pub fn contains(&self, actor: &ActorId) -> bool {
        self.by.contains(actor)
    }

    /// Flip the actor's reaction. Returns whether the actor now reacts.
    pub fn toggle(&mut self, actor: &ActorId) -> bool {
        if self.by.remove(actor) {
            false
        } else {
            self.by.insert(actor.clone());
            true
        }
    }
}

// ============================================================================
// Post payloads
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Text,
    Image,
    Video,
    Poll,
    Event,
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PostKind::Text => "text",
            PostKind::Image => "image",
            PostKind::Video => "video",
            PostKind::Poll => "poll",
            PostKind::Event => "event",
        };
        f.write_str(name)
    }
}

/// Kind-specific payload. The post kind is derived from this, so the two
/// can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostBody {
    #[default]
    Text,
    Image { media: Vec<MediaRef> },
    Video { media: MediaRef },
    Poll(Poll),
    Event(EventDetails),
}

impl PostBody {
    pub fn kind(&self) -> PostKind {
        match self {
            PostBody::Text => PostKind::Text,
            PostBody::Image { .. } => PostKind::Image,
            PostBody::Video { .. } => PostKind::Video,
            PostBody::Poll(_) => PostKind::Poll,
            PostBody::Event(_) => PostKind::Event,
        }
    }

    pub fn poll(&self) -> Option<&Poll> {
        match self {
            PostBody::Poll(poll) => Some(poll),
            _ => None,
        }
    }

    pub fn event(&self) -> Option<&EventDetails> {
        match self {
            PostBody::Event(event) => Some(event),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub question: String,
    pub options: Vec<PollOption>,
}

impl Poll {
    pub fn total_votes(&self) -> u32 {
        self.options
            .iter()
            .fold(0u32, |total, option| total.saturating_add(option.vote_count()))
    }

    pub fn has_voted(&self, actor: &ActorId) -> bool {
        self.options
            .iter()
            .any(|option| option.ballots.contains_key(actor))
    }
}

/// One selectable answer. Votes only accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    #[serde(default)]
    pub seeded_votes: u32,
    /// Votes per actor; an actor may appear with a count above one
    #[serde(default)]
    pub ballots: BTreeMap<ActorId, u32>,
}

impl PollOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            seeded_votes: 0,
            ballots: BTreeMap::new(),
        }
    }

    pub fn with_votes(text: impl Into<String>, votes: u32) -> Self {
        Self {
            seeded_votes: votes,
            ..Self::new(text)
        }
    }

    pub fn vote_count(&self) -> u32 {
        self.ballots
            .values()
            .fold(self.seeded_votes, |total, votes| total.saturating_add(*votes))
    }

    pub fn record_vote(&mut self, actor: &ActorId) {
        let votes = self.ballots.entry(actor.clone()).or_insert(0);
        *votes = votes.saturating_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub datetime: NaiveDateTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Reactions,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl EventDetails {
    pub fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|capacity| self.attendees.count() >= capacity)
    }
}

// ============================================================================
// Comments
// ============================================================================

/// Top-level comment. Replies nest exactly one level deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: Author,
    pub content: String,
    #[serde(default)]
    pub created_label: String,
    #[serde(default)]
    pub likes: Reactions,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

/// A reply to a top-level comment. Has no replies of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: CommentId,
    pub author: Author,
    pub content: String,
    #[serde(default)]
    pub created_label: String,
    #[serde(default)]
    pub likes: Reactions,
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: Author,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_label: String,
    #[serde(default)]
    pub body: PostBody,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub likes: Reactions,
    #[serde(default)]
    pub bookmarked_by: BTreeSet<ActorId>,
    /// Displayed comment tally; replies are not counted
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub comments: Vec<Arc<Comment>>,
    #[serde(default)]
    pub share_count: u32,
    /// Set only on reposts: the forwarded post as it was at forward time
    #[serde(default)]
    pub original: Option<Box<PostSnapshot>>,
}

impl Post {
    pub fn kind(&self) -> PostKind {
        self.body.kind()
    }

    pub fn like_count(&self) -> u32 {
        self.likes.count()
    }

    pub fn is_liked_by(&self, actor: &ActorId) -> bool {
        self.likes.contains(actor)
    }

    pub fn is_bookmarked_by(&self, actor: &ActorId) -> bool {
        self.bookmarked_by.contains(actor)
    }

    pub fn is_repost(&self) -> bool {
        self.original.is_some()
    }

    /// Structural copy of the public fields, detached from this post
    pub fn snapshot(&self) -> PostSnapshot {
        PostSnapshot {
            id: self.id,
            author: self.author.clone(),
            content: self.content.clone(),
            created_label: self.created_label.clone(),
            body: self.body.clone(),
            tags: self.tags.clone(),
            like_count: self.like_count(),
            comment_count: self.comment_count,
            share_count: self.share_count,
            forwarded_from: self.original.as_ref().map(|original| original.id),
        }
    }
}

/// Frozen copy of a post stored on its reposts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSnapshot {
    pub id: PostId,
    pub author: Author,
    pub content: String,
    pub created_label: String,
    pub body: PostBody,
    pub tags: BTreeSet<String>,
    pub like_count: u32,
    pub comment_count: u32,
    pub share_count: u32,
    /// When the snapshotted post was itself a repost, the post it forwarded
    pub forwarded_from: Option<PostId>,
}

// ============================================================================
// Community members
// ============================================================================

/// Roster role. Declaration order is display priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Founder,
    Moderator,
    Member,
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "founder" => Ok(MemberRole::Founder),
            "moderator" => Ok(MemberRole::Moderator),
            "member" => Ok(MemberRole::Member),
            _ => Err(format!(
                "Invalid member role: '{}'. Valid options: founder, moderator, member",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub role: MemberRole,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub online: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: &str) -> ActorId {
        ActorId::from(id)
    }

    #[test]
    fn test_reactions_toggle_round_trips() {
        let mut likes = Reactions::seeded(24, None);
        assert!(likes.toggle(&actor("me")));
        assert_eq!(likes.count(), 25);
        assert!(!likes.toggle(&actor("me")));
        assert_eq!(likes.count(), 24);
    }

    #[test]
    fn test_reactions_seeded_as_liked() {
        let likes = Reactions::seeded(67, Some(actor("me")));
        assert_eq!(likes.count(), 67);
        assert!(likes.contains(&actor("me")));
    }

    #[test]
    fn test_reactions_seeded_liked_at_zero_is_clamped() {
        let mut likes = Reactions::seeded(0, Some(actor("me")));
        assert_eq!(likes.count(), 1);

        likes.toggle(&actor("me"));
        assert_eq!(likes.count(), 0);
    }

    #[test]
    fn test_poll_option_counts_repeat_votes() {
        let mut option = PollOption::with_votes("Yes", 3);
        option.record_vote(&actor("me"));
        option.record_vote(&actor("me"));
        assert_eq!(option.vote_count(), 5);
        assert_eq!(option.ballots.get(&actor("me")), Some(&2));
    }

    #[test]
    fn test_body_kind_matches_payload() {
        assert_eq!(PostBody::Text.kind(), PostKind::Text);
        let video = PostBody::Video {
            media: MediaRef::from("blob:1"),
        };
        assert_eq!(video.kind(), PostKind::Video);
        assert!(video.poll().is_none());
    }

    #[test]
    fn test_post_body_json_shape() {
        let body = PostBody::Image {
            media: vec![MediaRef::from("a.png")],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "image");
        assert_eq!(json["media"][0], "a.png");
    }

    #[test]
    fn test_event_is_full() {
        let mut event = EventDetails {
            title: "Kardiologie Update".to_string(),
            datetime: chrono::NaiveDate::from_ymd_opt(2024, 12, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            location: Some("München".to_string()),
            attendees: Reactions::seeded(1, None),
            capacity: Some(2),
        };
        assert!(!event.is_full());
        event.attendees.toggle(&actor("me"));
        assert!(event.is_full());
    }

    #[test]
    fn test_member_role_priority_order() {
        assert!(MemberRole::Founder < MemberRole::Moderator);
        assert!(MemberRole::Moderator < MemberRole::Member);
        assert_eq!("Moderator".parse::<MemberRole>().unwrap(), MemberRole::Moderator);
        assert!("admin".parse::<MemberRole>().is_err());
    }
}
