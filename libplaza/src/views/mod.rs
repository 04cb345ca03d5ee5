//! Derived views
//!
//! Read-only projections over the feed. Nothing here is stored as primary
//! state; every function recomputes from the collection it is given and
//! leaves that collection untouched.

pub mod card;
pub mod filter;
pub mod members;
pub mod poll;

pub use card::{post_card, CommentCard, EventView, PollOptionView, PollView, PostCard};
pub use filter::{filter_feed, FeedFilter, FilterOptions};
pub use members::{order_members, MemberQuery};
pub use poll::{attendance_rate, percentage, poll_percentages};
