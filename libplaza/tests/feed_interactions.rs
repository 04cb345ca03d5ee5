//! Integration tests for FeedService
//!
//! Drives the façade the way a rendering surface would and checks the
//! resulting cards, outcomes and events.

use libplaza::error::{Rejection, Target};
use libplaza::events::{Change, Event};
use libplaza::feed::{DraftBody, PostDraft, ReportTarget};
use libplaza::types::{Author, Comment, CommentId, Post, PostBody, PostId, Reactions, Reply};
use libplaza::types::{Poll, PollOption};
use libplaza::views::FeedFilter;
use libplaza::{Config, Feed, FeedService, Outcome};
use std::sync::Arc;

fn author(name: &str) -> Author {
    Author::new(name, "Kardiologin", "SK")
}

fn text_post(id: u64, name: &str, likes: u32, shares: u32) -> Post {
    Post {
        id: PostId(id),
        author: author(name),
        content: "Spannender Fall aus der Notaufnahme".to_string(),
        created_label: "vor 2 Stunden".to_string(),
        body: PostBody::Text,
        tags: Default::default(),
        likes: Reactions::seeded(likes, None),
        bookmarked_by: Default::default(),
        comment_count: 1,
        comments: vec![Arc::new(Comment {
            id: CommentId(100),
            author: author("Dr. Max Müller"),
            content: "Sehr interessant!".to_string(),
            created_label: "vor 1 Stunde".to_string(),
            likes: Reactions::seeded(3, None),
            replies: vec![Reply {
                id: CommentId(101),
                author: author("Dr. Lisa Müller"),
                content: "Finde ich auch".to_string(),
                created_label: "vor 30 Minuten".to_string(),
                likes: Reactions::default(),
            }],
        })],
        share_count: shares,
        original: None,
    }
}

fn poll_post(id: u64) -> Post {
    Post {
        body: PostBody::Poll(Poll {
            question: "Wie oft nutzt ihr Telemedizin?".to_string(),
            options: vec![
                PollOption::with_votes("Täglich", 45),
                PollOption::with_votes("Selten", 78),
                PollOption::with_votes("Nie", 12),
            ],
        }),
        comments: Vec::new(),
        comment_count: 0,
        ..text_post(id, "Dr. Anna Berg", 10, 0)
    }
}

fn setup_service(config: &Config) -> FeedService {
    FeedService::with_feed(
        config,
        Feed::from_posts(vec![
            text_post(1, "Dr. Sarah Klein", 24, 5),
            poll_post(2),
            Post {
                comments: Vec::new(),
                comment_count: 0,
                ..text_post(3, "Prof. Dr. Michael Weber", 67, 0)
            },
        ])
        .unwrap(),
    )
}

#[test]
fn test_like_toggle_round_trip() {
    let mut service = setup_service(&Config::default_config());

    service.toggle_like(PostId(1));
    let card = service.card(PostId(1)).unwrap();
    assert!(card.liked);
    assert_eq!(card.like_count, 25);

    service.toggle_like(PostId(1));
    let card = service.card(PostId(1)).unwrap();
    assert!(!card.liked);
    assert_eq!(card.like_count, 24);
}

#[test]
fn test_like_count_never_negative() {
    let mut service = FeedService::with_feed(
        &Config::default_config(),
        Feed::from_posts(vec![text_post(1, "Dr. Sarah Klein", 0, 0)]).unwrap(),
    );

    for _ in 0..7 {
        service.toggle_like(PostId(1));
        let card = service.card(PostId(1)).unwrap();
        assert_eq!(card.like_count, u32::from(card.liked));
    }
}

#[test]
fn test_repeat_votes_accumulate() {
    let mut service = setup_service(&Config::default_config());

    let before = service.card(PostId(2)).unwrap().poll.unwrap().total_votes;
    assert!(service.vote_poll(PostId(2), 0).is_applied());
    assert!(service.vote_poll(PostId(2), 0).is_applied());

    let poll = service.card(PostId(2)).unwrap().poll.unwrap();
    assert_eq!(poll.options[0].votes, 47);
    assert_eq!(poll.total_votes, before + 2);
    assert!(poll.voted);
}

#[test]
fn test_single_vote_policy() {
    let mut config = Config::default_config();
    config.polls.allow_repeat_votes = false;
    let mut service = setup_service(&config);

    assert!(service.vote_poll(PostId(2), 1).is_applied());
    let second = service.vote_poll(PostId(2), 2);

    assert_eq!(second.notice().map(|notice| notice.kind), Some("already-voted"));
    let poll = service.card(PostId(2)).unwrap().poll.unwrap();
    assert_eq!(poll.total_votes, 136);
}

#[test]
fn test_vote_on_missing_option_is_ignored() {
    let mut service = setup_service(&Config::default_config());
    let outcome = service.vote_poll(PostId(2), 7);
    assert_eq!(
        outcome,
        Outcome::Ignored(Rejection::NotFound(Target::PollOption {
            post_id: PostId(2),
            index: 7
        }))
    );
}

#[test]
fn test_repost_preserves_provenance() {
    let mut service = setup_service(&Config::default_config());
    let original_content = service.card(PostId(1)).unwrap().content;

    let outcome = service.repost(PostId(1));
    let Outcome::Applied(Event::FeedChanged {
        change: Change::PostReposted { repost_id, .. },
        ..
    }) = &outcome
    else {
        panic!("expected a repost event, got {:?}", outcome);
    };
    let repost_id = *repost_id;

    assert_eq!(service.feed().posts()[0].id, repost_id);
    assert_eq!(service.card(PostId(1)).unwrap().share_count, 6);

    let repost = service.card(repost_id).unwrap();
    let original = repost.original.unwrap();
    assert_eq!(original.id, PostId(1));
    assert_eq!(original.content, original_content);
    assert_eq!(original.share_count, 5);
    assert!(repost
        .content
        .starts_with("Forwarded from Dr. Sarah Klein:"));
}

#[test]
fn test_reply_to_reply_is_not_found() {
    let mut service = setup_service(&Config::default_config());

    let outcome = service.add_reply(PostId(1), CommentId(101), "Noch eine Ebene");
    assert_eq!(
        outcome,
        Outcome::Ignored(Rejection::NotFound(Target::TopLevelComment {
            id: CommentId(101)
        }))
    );

    let card = service.card(PostId(1)).unwrap();
    assert_eq!(card.comments[0].replies.len(), 1);
}

#[test]
fn test_reply_and_reply_like() {
    let mut service = setup_service(&Config::default_config());

    assert!(service
        .add_reply(PostId(1), CommentId(100), "Danke für den Hinweis")
        .is_applied());
    assert!(service
        .toggle_comment_like(CommentId(101), Some(CommentId(100)))
        .is_applied());

    let card = service.card(PostId(1)).unwrap();
    let comment = &card.comments[0];
    assert_eq!(comment.replies.len(), 2);
    assert!(comment.replies[0].liked);
    assert_eq!(comment.replies[0].like_count, 1);
    // replies are not part of the displayed tally
    assert_eq!(card.comment_count, 1);
}

#[test]
fn test_blank_poll_question_leaves_feed_unchanged() {
    let mut service = setup_service(&Config::default_config());
    let before = service.feed().posts().to_vec();

    let outcome = service.create_post(PostDraft::poll("", &["a", "b"]));

    assert!(matches!(outcome, Outcome::Rejected(_)));
    assert_eq!(service.feed().len(), before.len());
    assert!(before
        .iter()
        .zip(service.feed().posts())
        .all(|(a, b)| Arc::ptr_eq(a, b)));
}

#[test]
fn test_blank_poll_options_are_dropped() {
    let mut service = setup_service(&Config::default_config());

    assert!(service
        .create_post(PostDraft::poll("Q", &["a", "b", ""]))
        .is_applied());

    let newest = service.feed().posts()[0].clone();
    let poll = newest.body.poll().unwrap();
    assert_eq!(poll.options.len(), 2);
    assert_eq!(newest.author.name, "Dr. Your Name");
}

#[test]
fn test_event_capacity_and_attendance() {
    let mut service = setup_service(&Config::default_config());
    let draft = PostDraft {
        content: "Online Case Discussion".to_string(),
        tags: vec!["Fortbildung".to_string()],
        body: DraftBody::Event {
            title: "Fallbesprechung".to_string(),
            date: "2024-12-20T19:00".to_string(),
            location: Some("Online".to_string()),
            capacity: Some(1),
        },
    };
    assert!(service.create_post(draft).is_applied());
    let event_id = service.feed().posts()[0].id;

    assert!(service.toggle_attendance(event_id).is_applied());
    let event = service.card(event_id).unwrap().event.unwrap();
    assert!(event.attending);
    assert_eq!(event.attendance_rate, Some(100));

    // leaving a full event is always allowed
    assert!(service.toggle_attendance(event_id).is_applied());
    assert!(!service.card(event_id).unwrap().event.unwrap().attending);
}

#[test]
fn test_missing_event_fields_notice() {
    let mut service = setup_service(&Config::default_config());
    let outcome = service.create_post(PostDraft::event("", ""));
    let notice = outcome.notice().unwrap();
    assert_eq!(notice.kind, "missing-event-fields");
    assert_eq!(notice.message, "An event needs a title and a date");
}

#[test]
fn test_following_view_tracks_social_graph() {
    let mut service = setup_service(&Config::default_config());
    assert!(service.view(FeedFilter::Following).is_empty());

    service.follow_author("Dr. Sarah Klein");
    let following = service.view(FeedFilter::Following);
    assert_eq!(following.len(), 1);
    assert!(following[0].author_followed);

    // the embedded snapshot flag is separate from the graph
    assert!(!service.feed().get(PostId(1)).unwrap().author.following);
}

#[test]
fn test_saved_view_after_bookmark() {
    let mut service = setup_service(&Config::default_config());
    service.toggle_bookmark(PostId(3));

    let saved = service.view(FeedFilter::Saved);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, PostId(3));
    assert!(saved[0].bookmarked);
}

#[test]
fn test_removed_post_ignores_later_actions() {
    let mut service = setup_service(&Config::default_config());
    assert!(service.remove_post(PostId(3)).is_applied());

    assert!(matches!(service.toggle_like(PostId(3)), Outcome::Ignored(_)));
    assert!(matches!(
        service.report(ReportTarget::Post { id: PostId(3) }),
        Outcome::Ignored(_)
    ));
    assert_eq!(service.feed().len(), 2);
}

#[tokio::test]
async fn test_subscribers_see_each_revision() {
    let mut service = setup_service(&Config::default_config());
    let mut receiver = service.subscribe();

    service.toggle_like(PostId(1));
    service.add_comment(PostId(1), "Gute Zusammenfassung");
    service.add_comment(PostId(1), "   ");

    match receiver.recv().await.unwrap() {
        Event::FeedChanged { revision, change } => {
            assert_eq!(revision, 1);
            assert_eq!(change, Change::PostUpdated { post_id: PostId(1) });
        }
        other => panic!("unexpected event {:?}", other),
    }
    match receiver.recv().await.unwrap() {
        Event::FeedChanged {
            revision,
            change: Change::CommentAdded { post_id, .. },
        } => {
            assert_eq!(revision, 2);
            assert_eq!(post_id, PostId(1));
        }
        other => panic!("unexpected event {:?}", other),
    }
    match receiver.recv().await.unwrap() {
        Event::ActionRejected { action, kind, .. } => {
            assert_eq!(action, "add_comment");
            assert_eq!(kind, "empty-content");
        }
        other => panic!("unexpected event {:?}", other),
    }
}
