//! Named feed views

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::feed::{Feed, SocialGraph};
use crate::types::{ActorId, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFilter {
    #[default]
    All,
    /// Posts by verified or followed authors
    Following,
    /// Posts with more likes than the trending threshold
    Trending,
    /// Posts the actor bookmarked
    Saved,
}

impl FromStr for FeedFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(FeedFilter::All),
            "following" => Ok(FeedFilter::Following),
            "trending" => Ok(FeedFilter::Trending),
            "saved" => Ok(FeedFilter::Saved),
            _ => Err(format!(
                "Invalid feed view: '{}'. Valid options: all, following, trending, saved",
                s
            )),
        }
    }
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedFilter::All => "all",
            FeedFilter::Following => "following",
            FeedFilter::Trending => "trending",
            FeedFilter::Saved => "saved",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub actor: ActorId,
    pub trending_threshold: u32,
}

impl FeedFilter {
    pub fn matches(&self, post: &Post, graph: &SocialGraph, options: &FilterOptions) -> bool {
        match self {
            FeedFilter::All => true,
            FeedFilter::Following => {
                post.author.verified
                    || post.author.following
                    || graph.follows(&post.author.name)
            }
            FeedFilter::Trending => post.like_count() > options.trending_threshold,
            FeedFilter::Saved => post.is_bookmarked_by(&options.actor),
        }
    }
}

/// The posts visible under `filter`, in feed order
pub fn filter_feed(feed: &Feed, filter: FeedFilter, options: &FilterOptions) -> Vec<Arc<Post>> {
    feed.posts()
        .iter()
        .filter(|post| filter.matches(post, feed.graph(), options))
        .cloned()
        .collect()
}
