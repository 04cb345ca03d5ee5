//! Text and JSON rendering of outcomes, feed views and rosters

use std::str::FromStr;

use anyhow::Result;
use libplaza::events::Event;
use libplaza::feed::ReportTarget;
use libplaza::service::{Notice, Outcome};
use libplaza::types::Member;
use libplaza::views::{FeedFilter, PostCard};
use serde::Serialize;

const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid format '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    line: usize,
    action: &'a str,
    outcome: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

#[derive(Serialize)]
struct ViewRecord<'a> {
    view: String,
    revision: u64,
    posts: &'a [PostCard],
}

pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn outcome(&self, line: usize, action: &str, outcome: &Outcome) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let record = OutcomeRecord {
                    line,
                    action,
                    outcome: outcome.label(),
                    event: match outcome {
                        Outcome::Applied(event) => Some(event),
                        _ => None,
                    },
                    notice: outcome.notice(),
                    reason: match outcome {
                        Outcome::Ignored(rejection) => Some(rejection.to_string()),
                        _ => None,
                    },
                };
                println!("{}", serde_json::to_string(&record)?);
            }
            OutputFormat::Text => {
                let detail = match outcome {
                    Outcome::Applied(Event::FeedChanged { revision, .. }) => {
                        format!("revision {}", revision)
                    }
                    Outcome::Applied(Event::ReportFiled { target, .. }) => match target {
                        ReportTarget::Post { id } => format!("reported post {}", id),
                        ReportTarget::Comment { id } => format!("reported comment {}", id),
                    },
                    Outcome::Applied(Event::ActionRejected { message, .. }) => message.clone(),
                    Outcome::Rejected(rejection) => format!("[{}] {}", rejection.kind(), rejection),
                    Outcome::Ignored(rejection) => rejection.to_string(),
                    Outcome::Duplicate => "request already seen".to_string(),
                };
                println!("{:>4} {} {}: {}", line, action, outcome.label(), detail);
            }
        }
        Ok(())
    }

    pub fn view(&self, filter: FeedFilter, revision: u64, cards: &[PostCard]) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let record = ViewRecord {
                    view: filter.to_string(),
                    revision,
                    posts: cards,
                };
                println!("{}", serde_json::to_string(&record)?);
            }
            OutputFormat::Text => {
                println!(
                    "== {} (revision {}, {} posts) ==",
                    filter,
                    revision,
                    cards.len()
                );
                for card in cards {
                    print_card(card);
                }
            }
        }
        Ok(())
    }

    pub fn roster(&self, members: &[Member]) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(members)?),
            OutputFormat::Text => {
                for member in members {
                    let status = if member.online { "online" } else { "offline" };
                    println!(
                        "{:<10} {:<8} {} | {} | {}",
                        format!("{:?}", member.role).to_lowercase(),
                        status,
                        member.name,
                        member.title,
                        member.location
                    );
                }
            }
        }
        Ok(())
    }
}

fn print_card(card: &PostCard) {
    let mut flags = Vec::new();
    if card.liked {
        flags.push("liked");
    }
    if card.bookmarked {
        flags.push("saved");
    }
    if card.author_followed {
        flags.push("following");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    println!(
        "#{} {} ({}) | {} | {} likes, {} comments, {} shares{}",
        card.id,
        card.author.name,
        card.author.role,
        card.kind,
        card.like_count,
        card.comment_count,
        card.share_count,
        flags
    );
    if !card.content.is_empty() {
        println!("  {}", preview(&card.content));
    }
    if let Some(original) = &card.original {
        println!("  forwarded: #{} by {}", original.id, original.author.name);
    }
    if let Some(poll) = &card.poll {
        println!("  poll: {} ({} votes)", poll.question, poll.total_votes);
        for option in &poll.options {
            println!("    {} {} ({}%)", option.text, option.votes, option.percentage);
        }
    }
    if let Some(event) = &card.event {
        let rate = event
            .attendance_rate
            .map(|rate| format!(" ({}% full)", rate))
            .unwrap_or_default();
        println!(
            "  event: {} on {} at {}, {} attending{}",
            event.title,
            event.datetime.format("%Y-%m-%d %H:%M"),
            event.location.as_deref().unwrap_or("TBA"),
            event.attendees,
            rate
        );
    }
    for comment in &card.comments {
        println!("  > {}: {}", comment.author.name, preview(&comment.content));
        for reply in &comment.replies {
            println!("    >> {}: {}", reply.author.name, preview(&reply.content));
        }
    }
}

/// First line, cut to a fixed number of characters
fn preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    if first_line.chars().count() > PREVIEW_CHARS {
        let cut: String = first_line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}
