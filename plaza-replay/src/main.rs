//! plaza-replay - Replay recorded feed actions against a seeded feed

mod input;
mod output;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use libplaza::logging::LoggingConfig;
use libplaza::types::MemberRole;
use libplaza::views::{FeedFilter, MemberQuery};
use libplaza::{Config, Feed, FeedService, Outcome, PlazaError};

use crate::input::{parse_action_line, read_seed, ParsedLine};
use crate::output::{OutputFormat, Printer};

#[derive(Parser, Debug)]
#[command(name = "plaza-replay")]
#[command(version, about = "Replay recorded feed actions against a seeded feed")]
#[command(long_about = r#"Replay recorded feed actions against a seeded feed.

Actions are read one JSON object per line, from --actions or stdin. Blank
lines and lines starting with '#' are skipped. A line may carry a
"request_id"; repeated ids within the dedup window are dropped.

EXAMPLES:
    # Like post 1, then show the feed
    echo '{"action":"toggle_like","post_id":1}' | plaza-replay --seed feed.json

    # Replay a session and show trending posts as JSON
    plaza-replay --seed feed.json --actions session.jsonl --view trending --format json

    # Show the member roster, moderators only
    plaza-replay --seed feed.json --members --role moderator < /dev/null

EXIT CODES:
    0 - Success (rejected and ignored actions included)
    1 - Error (unreadable file, bad configuration)
    2 - An action was rejected and --strict was given
    3 - Invalid input (malformed seed or action lines)
"#)]
struct Cli {
    /// Seed feed (JSON with "posts" and optional "members")
    #[arg(short, long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Action log (JSON lines); reads stdin when omitted
    #[arg(short, long, value_name = "FILE")]
    actions: Option<PathBuf>,

    /// Feed view printed after the replay
    #[arg(long, default_value = "all", value_name = "VIEW")]
    #[arg(value_parser = ["all", "following", "trending", "saved"])]
    view: String,

    /// Print the member roster instead of the feed view
    #[arg(long)]
    members: bool,

    /// Roster search on name or title
    #[arg(long, value_name = "TERM", requires = "members")]
    search: Option<String>,

    /// Roster role filter (founder, moderator, member)
    #[arg(long, value_name = "ROLE", requires = "members")]
    role: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Config file (defaults to PLAZA_CONFIG or ~/.config/plaza/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Exit with code 2 when any action is rejected
    #[arg(long)]
    strict: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<PlazaError>()
            .map_or(1, PlazaError::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    tracing::debug!("plaza-replay started with args: {:?}", cli);

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load configuration")?,
    };

    let format: OutputFormat = cli.format.parse().map_err(PlazaError::InvalidInput)?;
    let filter: FeedFilter = cli.view.parse().map_err(PlazaError::InvalidInput)?;
    let printer = Printer::new(format);

    let seed = match &cli.seed {
        Some(path) => Some(read_seed(path)?),
        None => None,
    };

    let (mut service, members) = match seed {
        Some(seed) => (
            FeedService::with_feed(&config, Feed::from_posts(seed.posts)?),
            seed.members,
        ),
        None => (FeedService::new(&config), Vec::new()),
    };

    let reader: Box<dyn BufRead> = match &cli.actions {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open action log {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut malformed = 0usize;
    let mut first_rejection = None;
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.context("Failed to read action log")?;

        match parse_action_line(&line) {
            ParsedLine::Skip => {}
            ParsedLine::Malformed(reason) => {
                malformed += 1;
                eprintln!("Error: line {}: {}", line_number, reason);
            }
            ParsedLine::Action(entry) => {
                let name = entry.action.name();
                let outcome = match &entry.request_id {
                    Some(request_id) => service.dispatch_once(request_id, entry.action),
                    None => service.dispatch(entry.action),
                };
                printer.outcome(line_number, name, &outcome)?;
                if let Outcome::Rejected(rejection) = outcome {
                    first_rejection.get_or_insert(rejection);
                }
            }
        }
    }

    if cli.members {
        let query = MemberQuery {
            search: cli.search.unwrap_or_default(),
            role: cli
                .role
                .as_deref()
                .map(str::parse::<MemberRole>)
                .transpose()
                .map_err(PlazaError::InvalidInput)?,
        };
        printer.roster(&query.apply(&members))?;
    } else {
        printer.view(filter, service.feed().revision(), &service.view(filter))?;
    }

    if malformed > 0 {
        return Err(PlazaError::InvalidInput(format!(
            "{} malformed action line(s)",
            malformed
        ))
        .into());
    }

    if let (true, Some(rejection)) = (cli.strict, first_rejection) {
        return Err(PlazaError::Rejected(rejection).into());
    }

    Ok(())
}
