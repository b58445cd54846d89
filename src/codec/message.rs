//! Shared grammar for codecs that embed structured fields in message text.
//!
//! A message reads `message[ (#code)][ (help)][ [ref]]`. The optional
//! groups are anchored at the end of the text and must be preceded by
//! whitespace, so `call foo(x)` or `see [1] below` stay intact. Help may
//! contain one level of nested parentheses; a reference may not contain
//! brackets.
//!
//! The line form adds a location prefix:
//! `path:line:col: severity - message (#code) (help) [ref]`.

use super::DisplayOptions;
use crate::error::Result;
use crate::models::Issue;
use crate::options::{OptionSpec, ResolvedOptions};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const TAIL: &str = r"(?:\s+\(#(?P<code>[^()]+)\))?(?:\s+\((?P<help>(?:[^()]|\([^()]*\))*)\))?(?:\s+\[(?P<ref>[^\[\]]+)\])?\s*$";

static MESSAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?s)^\s*(?P<message>.*?){TAIL}")).unwrap());

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<path>(?:[A-Za-z]:)?[^:]+):(?P<line>\d+):(?P<col>\d+):\s(?P<severity>[A-Za-z]+)\s-\s(?P<message>.*?){TAIL}"
    ))
    .unwrap()
});

/// Whether a codec tries to split help and ref back out of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageOptions {
    pub parse_message: bool,
}

impl MessageOptions {
    pub fn specs(default: bool) -> Vec<OptionSpec> {
        vec![OptionSpec::flag(
            "parse-message",
            "Split help and ref back out of message text when parsing",
            default,
        )]
    }

    pub fn from_resolved(options: &ResolvedOptions) -> Result<Self> {
        Ok(MessageOptions {
            parse_message: options.flag("parse-message")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageParts {
    pub message: String,
    pub code: Option<String>,
    pub help: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLine {
    pub path: String,
    pub line: u32,
    pub column: u32,
    pub severity: String,
    pub parts: MessageParts,
}

fn group(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parts_from(caps: &Captures<'_>) -> MessageParts {
    MessageParts {
        message: caps
            .name("message")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        code: group(caps, "code"),
        help: group(caps, "help"),
        reference: group(caps, "ref"),
    }
}

/// Message text with the annotations enabled by `display`. The code is only
/// written when `with_code` is set and `display.show_code` allows it.
pub fn format_message(issue: &Issue, display: &DisplayOptions, with_code: bool) -> String {
    let mut out = issue.message.clone();
    if with_code && display.show_code && !issue.code.is_empty() {
        out.push_str(&format!(" (#{})", issue.code));
    }
    if display.show_help {
        if let Some(help) = issue.help.as_deref().filter(|h| !h.is_empty()) {
            out.push_str(&format!(" ({help})"));
        }
    }
    if display.show_ref {
        if let Some(reference) = issue.reference.as_deref().filter(|r| !r.is_empty()) {
            out.push_str(&format!(" [{reference}]"));
        }
    }
    out
}

/// Location-prefixed line form.
pub fn format_line(issue: &Issue, severity: &str, display: &DisplayOptions) -> String {
    format!(
        "{}:{}:{}: {} - {}",
        issue.path,
        issue.line,
        issue.column,
        severity,
        format_message(issue, display, true)
    )
}

pub fn parse_message(text: &str) -> MessageParts {
    match MESSAGE_RE.captures(text) {
        Some(caps) => parts_from(&caps),
        None => MessageParts {
            message: text.trim().to_string(),
            ..Default::default()
        },
    }
}

/// `None` when `text` is not a location-prefixed line.
pub fn parse_line(text: &str) -> Option<MessageLine> {
    let caps = LINE_RE.captures(text.trim_end())?;
    Some(MessageLine {
        path: caps.name("path")?.as_str().to_string(),
        line: caps.name("line")?.as_str().parse().ok()?,
        column: caps.name("col")?.as_str().parse().ok()?,
        severity: caps.name("severity")?.as_str().to_ascii_lowercase(),
        parts: parts_from(&caps),
    })
}
