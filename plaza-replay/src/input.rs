//! Seed file and action log parsing

use std::path::Path;

use anyhow::{Context, Result};
use libplaza::types::{Member, Post};
use libplaza::{Action, PlazaError};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub members: Vec<Member>,
}

/// One line of the action log
#[derive(Debug, Deserialize)]
pub struct ActionLine {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug)]
pub enum ParsedLine {
    Skip,
    Action(ActionLine),
    Malformed(String),
}

pub fn read_seed(path: &Path) -> Result<Seed> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed = serde_json::from_str(&content).map_err(|e| {
        PlazaError::InvalidInput(format!("seed file {}: {}", path.display(), e))
    })?;
    Ok(seed)
}

/// Blank lines and `#` comments are skipped
pub fn parse_action_line(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return ParsedLine::Skip;
    }
    match serde_json::from_str::<ActionLine>(trimmed) {
        Ok(entry) => ParsedLine::Action(entry),
        Err(e) => ParsedLine::Malformed(e.to_string()),
    }
}
