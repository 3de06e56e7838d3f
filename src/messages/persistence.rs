//! Flat text transcript log
//!
//! One message per line, `<Label>: <text>`. Newlines and backslashes inside a
//! message are escaped so a multi-line reply stays on a single line.
//! Carriage returns are escaped as `\r`.

use super::types::{Message, Speaker};
use crate::{MurmurError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Render messages in the saved-log format
pub fn render(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str(message.speaker.label());
        out.push_str(": ");
        out.push_str(&escape(&message.text));
        out.push('\n');
    }
    out
}

/// Parse a saved log
///
/// Lines without a known label become status messages. Blank lines are skipped.
pub fn parse(log: &str) -> Vec<Message> {
    log.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Message {
    for speaker in Speaker::ALL {
        if let Some(rest) = line
            .strip_prefix(speaker.label())
            .and_then(|rest| rest.strip_prefix(':'))
        {
            let text = rest.strip_prefix(' ').unwrap_or(rest);
            return Message::new(speaker, unescape(text));
        }
    }
    Message::status(unescape(line.trim()))
}

pub fn save(path: impl AsRef<Path>, messages: &[Message]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| persistence_error(parent, e))?;
    }
    fs::write(path, render(messages)).map_err(|e| persistence_error(path, e))?;
    info!("Saved {} messages to {:?}", messages.len(), path);
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<Vec<Message>> {
    let path = path.as_ref();
    let log = fs::read_to_string(path).map_err(|e| persistence_error(path, e))?;
    let messages = parse(&log);
    debug!("Parsed {} messages from {:?}", messages.len(), path);
    Ok(messages)
}

fn persistence_error(path: &Path, e: std::io::Error) -> MurmurError {
    MurmurError::PersistenceError(format!("{}: {}", path.display(), e))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
