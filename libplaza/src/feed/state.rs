//! The authoritative post collection
//!
//! Posts and comments sit behind `Arc`s. Cloning a [`Feed`] copies pointers,
//! and a mutation replaces only the post (and comment) it touches, so
//! every untouched post keeps its identity across revisions.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{PlazaError, Rejection, Result as PlazaResult, Target};
use crate::types::{ActorId, Author, CommentId, Post, PostId};

/// Normalized follow state keyed by author name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialGraph {
    followed: BTreeSet<String>,
}

impl SocialGraph {
    pub fn follows(&self, name: &str) -> bool {
        self.followed.contains(name)
    }

    /// Returns whether the author is followed afterwards
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.followed.remove(name) {
            false
        } else {
            self.followed.insert(name.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.followed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.followed.is_empty()
    }
}

/// Limits and labels the engine applies while reducing
#[derive(Debug, Clone)]
pub struct Limits {
    pub max_images: usize,
    pub max_poll_options: usize,
    pub allow_repeat_votes: bool,
    pub forward_prefix: String,
    pub just_now_label: String,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Limits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_images: config.composer.max_images,
            max_poll_options: config.composer.max_poll_options,
            allow_repeat_votes: config.polls.allow_repeat_votes,
            forward_prefix: config.feed.forward_prefix.clone(),
            just_now_label: config.feed.just_now_label.clone(),
        }
    }
}

/// Who is acting, and under which limits
#[derive(Debug, Clone)]
pub struct Session {
    pub actor: ActorId,
    pub author: Author,
    pub limits: Limits,
}

impl Session {
    pub fn new(actor: ActorId, author: Author) -> Self {
        Self {
            actor,
            author,
            limits: Limits::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            actor: config.actor.actor_id(),
            author: config.actor.author(),
            limits: Limits::from_config(config),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feed {
    posts: Vec<Arc<Post>>,
    #[serde(default)]
    graph: SocialGraph,
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    revision: u64,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a feed from existing posts, newest first.
    ///
    /// Post ids must be unique, and so must comment and reply ids across the
    /// whole feed. The id allocator starts above every id already present.
    pub fn from_posts(posts: Vec<Post>) -> PlazaResult<Self> {
        let mut post_ids = HashSet::new();
        let mut comment_ids = HashSet::new();
        let mut highest: u64 = 0;

        for post in &posts {
            if !post_ids.insert(post.id) {
                return Err(PlazaError::InvalidInput(format!(
                    "duplicate post id {}",
                    post.id
                )));
            }
            highest = highest.max(post.id.0);

            let threads = post.comments.iter().flat_map(|comment| {
                std::iter::once(comment.id).chain(comment.replies.iter().map(|reply| reply.id))
            });
            for id in threads {
                if !comment_ids.insert(id) {
                    return Err(PlazaError::InvalidInput(format!(
                        "duplicate comment id {} in post {}",
                        id, post.id
                    )));
                }
                highest = highest.max(id.0);
            }
        }

        Ok(Self {
            posts: posts.into_iter().map(Arc::new).collect(),
            graph: SocialGraph::default(),
            next_id: highest.saturating_add(1),
            revision: 0,
        })
    }

    /// Raise the id allocator to at least `floor` (e.g. the current time in
    /// milliseconds). Never lowers it.
    pub fn with_id_floor(mut self, floor: u64) -> Self {
        self.next_id = self.next_id.max(floor);
        self
    }

    pub fn posts(&self) -> &[Arc<Post>] {
        &self.posts
    }

    pub fn get(&self, id: PostId) -> Option<&Arc<Post>> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Incremented by every structural mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn graph(&self) -> &SocialGraph {
        &self.graph
    }

    /// Whether any post holds a top-level comment or reply with this id
    pub fn contains_comment(&self, id: CommentId) -> bool {
        self.posts.iter().any(|post| {
            post.comments.iter().any(|comment| {
                comment.id == id || comment.replies.iter().any(|reply| reply.id == id)
            })
        })
    }

    // ------------------------------------------------------------------------
    // Mutation helpers for the reducer
    // ------------------------------------------------------------------------

    pub(crate) fn graph_mut(&mut self) -> &mut SocialGraph {
        &mut self.graph
    }

    /// Hand out the next free id. `u64::MAX` is never issued, so an
    /// allocator that reached it stays exhausted instead of repeating it.
    pub(crate) fn allocate_id(&mut self) -> Result<u64, Rejection> {
        let id = self.next_id.max(1);
        if id == u64::MAX {
            return Err(Rejection::IdsExhausted);
        }
        self.next_id = id + 1;
        Ok(id)
    }

    pub(crate) fn position(&self, id: PostId) -> Result<usize, Rejection> {
        self.posts
            .iter()
            .position(|post| post.id == id)
            .ok_or(Rejection::NotFound(Target::Post { id }))
    }

    /// Locate the post holding the top-level comment `id`.
    /// Returns `(post index, comment index)`.
    pub(crate) fn locate_top_level(&self, id: CommentId) -> Option<(usize, usize)> {
        self.posts.iter().enumerate().find_map(|(post_index, post)| {
            post.comments
                .iter()
                .position(|comment| comment.id == id)
                .map(|comment_index| (post_index, comment_index))
        })
    }

    /// Apply `update` to a copy of the post at `index` and swap the copy in.
    /// If `update` fails the feed is left as it was.
    pub(crate) fn update_at<T>(
        &mut self,
        index: usize,
        update: impl FnOnce(&mut Post) -> Result<T, Rejection>,
    ) -> Result<T, Rejection> {
        let mut post = Post::clone(&self.posts[index]);
        let value = update(&mut post)?;
        self.posts[index] = Arc::new(post);
        Ok(value)
    }

    pub(crate) fn update_post<T>(
        &mut self,
        id: PostId,
        update: impl FnOnce(&mut Post) -> Result<T, Rejection>,
    ) -> Result<T, Rejection> {
        let index = self.position(id)?;
        self.update_at(index, update)
    }

    pub(crate) fn prepend(&mut self, post: Post) {
        self.posts.insert(0, Arc::new(post));
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Arc<Post> {
        self.posts.remove(index)
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }
}
