//! Interaction façade for Plaza
//!
//! [`FeedService`] is the single entry point rendering surfaces call. It owns
//! the current [`Feed`] and the acting [`Session`], runs each action through
//! the pure reducer, swaps in the result, and publishes what happened on the
//! event bus.
//!
//! Rejections never escape as errors. Validation failures come back as
//! [`Outcome::Rejected`], with a [`Notice`] for inline display; actions on
//! ids that no longer exist are logged and ignored.
//!
//! # Example
//!
//! ```
//! use libplaza::service::{FeedService, Outcome};
//! use libplaza::feed::PostDraft;
//! use libplaza::Config;
//!
//! let mut service = FeedService::new(&Config::default_config());
//!
//! let created = service.create_post(PostDraft::text("Neue ESC-Leitlinien sind da"));
//! assert!(created.is_applied());
//!
//! let empty = service.create_post(PostDraft::text("   "));
//! assert!(matches!(empty, Outcome::Rejected(_)));
//! assert_eq!(service.feed().len(), 1);
//! ```

pub mod dedup;
pub mod outcome;

pub use dedup::RequestLog;
pub use outcome::{Notice, Outcome};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RejectionClass;
use crate::events::{Change, Event, EventBus, EventReceiver};
use crate::feed::{reduce, Action, Feed, PostDraft, ReportTarget, Session};
use crate::types::{CommentId, PostId};
use crate::views::{filter_feed, post_card, FeedFilter, FilterOptions, PostCard};

/// Owns the feed for one client session
pub struct FeedService {
    feed: Feed,
    session: Session,
    events: EventBus,
    requests: RequestLog,
    trending_threshold: u32,
}

impl FeedService {
    /// Start an empty session. New ids are allocated above the current time
    /// in milliseconds.
    pub fn new(config: &Config) -> Self {
        let floor = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        Self::with_feed(config, Feed::new().with_id_floor(floor))
    }

    /// Start a session over an existing feed
    pub fn with_feed(config: &Config, feed: Feed) -> Self {
        let session = Session::from_config(config);
        info!(
            "Feed session started for {} with {} posts",
            session.actor,
            feed.len()
        );
        Self {
            feed,
            session,
            events: EventBus::new(config.feed.event_capacity),
            requests: RequestLog::new(config.feed.dedup_window),
            trending_threshold: config.feed.trending_threshold,
        }
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Subscribe to feed events
    ///
    /// Each subscriber sees every event published after it subscribed.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Post cards for the current actor under `filter`
    pub fn view(&self, filter: FeedFilter) -> Vec<PostCard> {
        let options = FilterOptions {
            actor: self.session.actor.clone(),
            trending_threshold: self.trending_threshold,
        };
        filter_feed(&self.feed, filter, &options)
            .iter()
            .map(|post| post_card(post, &self.session.actor, self.feed.graph()))
            .collect()
    }

    /// Card for a single post, if it is still in the feed
    pub fn card(&self, post_id: PostId) -> Option<PostCard> {
        self.feed
            .get(post_id)
            .map(|post| post_card(post, &self.session.actor, self.feed.graph()))
    }

    /// Apply one action and publish the result
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        let name = action.name();

        match reduce(&self.feed, &self.session, action) {
            Ok((next, change)) => {
                self.feed = next;
                let event = match change {
                    Change::ReportFiled { target } => Event::ReportFiled {
                        revision: self.feed.revision(),
                        target,
                    },
                    change => Event::FeedChanged {
                        revision: self.feed.revision(),
                        change,
                    },
                };
                debug!("Applied {} at revision {}", name, self.feed.revision());
                self.events.emit(event.clone());
                Outcome::Applied(event)
            }
            Err(rejection) => match rejection.class() {
                RejectionClass::Validation => {
                    debug!("Rejected {}: {}", name, rejection);
                    self.events.emit(Event::ActionRejected {
                        action: name.to_string(),
                        kind: rejection.kind().to_string(),
                        message: rejection.to_string(),
                    });
                    Outcome::Rejected(rejection)
                }
                RejectionClass::NotFound => {
                    warn!("Ignoring {}: {}", name, rejection);
                    Outcome::Ignored(rejection)
                }
            },
        }
    }

    /// Dispatch unless `request_id` was seen within the dedup window.
    ///
    /// The id is remembered whatever the outcome, so a rejected request is
    /// not retried either.
    pub fn dispatch_once(&mut self, request_id: &str, action: Action) -> Outcome {
        if !self.requests.record(request_id) {
            debug!("Dropping duplicate request {}", request_id);
            return Outcome::Duplicate;
        }
        self.dispatch(action)
    }

    // ------------------------------------------------------------------------
    // One method per action
    // ------------------------------------------------------------------------

    pub fn toggle_like(&mut self, post_id: PostId) -> Outcome {
        self.dispatch(Action::ToggleLike { post_id })
    }

    pub fn toggle_bookmark(&mut self, post_id: PostId) -> Outcome {
        self.dispatch(Action::ToggleBookmark { post_id })
    }

    pub fn toggle_follow(&mut self, post_id: PostId) -> Outcome {
        self.dispatch(Action::ToggleFollow { post_id })
    }

    pub fn follow_author(&mut self, name: impl Into<String>) -> Outcome {
        self.dispatch(Action::FollowAuthor { name: name.into() })
    }

    pub fn add_comment(&mut self, post_id: PostId, text: impl Into<String>) -> Outcome {
        self.dispatch(Action::AddComment {
            post_id,
            text: text.into(),
        })
    }

    pub fn add_reply(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
        text: impl Into<String>,
    ) -> Outcome {
        self.dispatch(Action::AddReply {
            post_id,
            comment_id,
            text: text.into(),
        })
    }

    pub fn toggle_comment_like(
        &mut self,
        comment_id: CommentId,
        parent_id: Option<CommentId>,
    ) -> Outcome {
        self.dispatch(Action::ToggleCommentLike {
            comment_id,
            parent_id,
        })
    }

    pub fn vote_poll(&mut self, post_id: PostId, option_index: usize) -> Outcome {
        self.dispatch(Action::VotePoll {
            post_id,
            option_index,
        })
    }

    pub fn repost(&mut self, post_id: PostId) -> Outcome {
        self.dispatch(Action::Repost { post_id })
    }

    pub fn create_post(&mut self, draft: PostDraft) -> Outcome {
        self.dispatch(Action::CreatePost { draft })
    }

    pub fn remove_post(&mut self, post_id: PostId) -> Outcome {
        self.dispatch(Action::RemovePost { post_id })
    }

    pub fn toggle_attendance(&mut self, post_id: PostId) -> Outcome {
        self.dispatch(Action::ToggleAttendance { post_id })
    }

    pub fn report(&mut self, target: ReportTarget) -> Outcome {
        self.dispatch(Action::Report { target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Rejection, Target};
    use crate::types::{Author, Post, PostBody, Reactions};

    fn seed_post(id: u64, likes: u32) -> Post {
        Post {
            id: PostId(id),
            author: Author::new("Dr. Sarah Klein", "Kardiologin", "SK"),
            content: "Interessanter Fall heute".to_string(),
            created_label: "vor 2 Stunden".to_string(),
            body: PostBody::Text,
            tags: Default::default(),
            likes: Reactions::seeded(likes, None),
            bookmarked_by: Default::default(),
            comment_count: 0,
            comments: Vec::new(),
            share_count: 5,
            original: None,
        }
    }

    fn service() -> FeedService {
        FeedService::with_feed(
            &Config::default_config(),
            Feed::from_posts(vec![seed_post(1, 24), seed_post(2, 80)]).unwrap(),
        )
    }

    #[test]
    fn test_applied_action_replaces_feed() {
        let mut service = service();
        let outcome = service.toggle_like(PostId(1));

        assert!(outcome.is_applied());
        assert_eq!(service.feed().revision(), 1);
        let card = service.card(PostId(1)).unwrap();
        assert!(card.liked);
        assert_eq!(card.like_count, 25);
    }

    #[test]
    fn test_validation_rejection_becomes_notice() {
        let mut service = service();
        let outcome = service.add_comment(PostId(1), "  ");

        let notice = outcome.notice().unwrap();
        assert_eq!(notice.kind, "empty-content");
        assert_eq!(service.feed().revision(), 0);
    }

    #[test]
    fn test_missing_target_is_ignored() {
        let mut service = service();
        let outcome = service.toggle_like(PostId(99));

        assert_eq!(
            outcome,
            Outcome::Ignored(Rejection::NotFound(Target::Post { id: PostId(99) }))
        );
        assert_eq!(service.feed().revision(), 0);
    }

    #[test]
    fn test_dispatch_once_drops_repeats() {
        let mut service = service();
        let first = service.dispatch_once("req-1", Action::ToggleLike { post_id: PostId(1) });
        let second = service.dispatch_once("req-1", Action::ToggleLike { post_id: PostId(1) });

        assert!(first.is_applied());
        assert_eq!(second, Outcome::Duplicate);
        assert_eq!(service.card(PostId(1)).unwrap().like_count, 25);
    }

    #[test]
    fn test_report_carries_unchanged_revision() {
        let mut service = service();
        service.toggle_like(PostId(1));
        let mut receiver = service.subscribe();
        let target = ReportTarget::Post { id: PostId(2) };

        let outcome = service.report(target);

        let expected = Event::ReportFiled {
            revision: 1,
            target,
        };
        assert_eq!(outcome, Outcome::Applied(expected.clone()));
        assert_eq!(service.feed().revision(), 1);
        assert_eq!(receiver.try_recv().unwrap(), expected);
    }

    #[test]
    fn test_unvalidated_buffer_sizes_do_not_panic() {
        let mut config = Config::default_config();
        config.feed.event_capacity = usize::MAX;
        config.feed.dedup_window = usize::MAX;

        let mut service =
            FeedService::with_feed(&config, Feed::from_posts(vec![seed_post(1, 0)]).unwrap());
        let mut receiver = service.subscribe();

        assert!(service
            .dispatch_once("req-1", Action::ToggleLike { post_id: PostId(1) })
            .is_applied());
        assert!(receiver.try_recv().is_ok());
    }

    #[test]
    fn test_exhausted_ids_reject_new_content() {
        let mut service = FeedService::with_feed(
            &Config::default_config(),
            Feed::from_posts(vec![seed_post(u64::MAX, 0)]).unwrap(),
        );

        let outcome = service.create_post(PostDraft::text("Noch ein Beitrag"));

        assert_eq!(outcome, Outcome::Rejected(Rejection::IdsExhausted));
        assert_eq!(service.feed().len(), 1);
        assert_eq!(service.feed().revision(), 0);
    }

    #[test]
    fn test_view_uses_trending_threshold() {
        let service = service();
        let trending = service.view(FeedFilter::Trending);
        assert_eq!(trending.len(), 1);
        assert_eq!(trending[0].id, PostId(2));
    }

    #[test]
    fn test_new_session_allocates_above_clock_floor() {
        let mut service = FeedService::new(&Config::default_config());
        service.create_post(PostDraft::text("Hallo Kolleginnen und Kollegen"));
        let id = service.feed().posts()[0].id;
        assert!(id.0 > 1_600_000_000_000);
    }
}
