//! Terminal presentation options: colors, emoji and wrapping.

use crate::error::{ReportError, Result};
use crate::models::Severity;
use crate::options::{OptionSpec, ResolvedOptions};
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RichOptions {
    /// Wrap width for free text; `0` disables wrapping.
    pub max_width: usize,
    pub color: bool,
    pub emoji: bool,
}

impl Default for RichOptions {
    fn default() -> Self {
        RichOptions {
            max_width: 0,
            color: true,
            emoji: true,
        }
    }
}

impl RichOptions {
    pub fn specs() -> Vec<OptionSpec> {
        vec![
            OptionSpec::integer("max-width", "Wrap text at this width (0 = no wrap)", 0),
            OptionSpec::flag("color", "Use ANSI colors", true),
            OptionSpec::flag("emoji", "Prefix severities with an emoji", true),
        ]
    }

    pub fn from_resolved(options: &ResolvedOptions) -> Result<Self> {
        let width = options.integer("max-width")?;
        let max_width = usize::try_from(width)
            .map_err(|_| ReportError::configuration("max-width", "must not be negative"))?;
        Ok(RichOptions {
            max_width,
            color: options.flag("color")?,
            emoji: options.flag("emoji")?,
        })
    }

    pub fn severity_icon(&self, severity: Severity) -> &'static str {
        if !self.emoji {
            return "";
        }
        match severity {
            Severity::Error => "❌",
            Severity::Warning => "⚠️",
            Severity::Tip => "💡",
        }
    }

    /// Severity label, colored when enabled.
    pub fn severity_label(&self, severity: Severity) -> String {
        let label = severity.label();
        if !self.color {
            return label.to_string();
        }
        match severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Tip => label.blue().bold().to_string(),
        }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.bright_black().to_string()
        } else {
            text.to_string()
        }
    }

    /// Split `text` into lines no longer than `max_width` characters,
    /// breaking on whitespace where possible.
    pub fn wrap(&self, text: &str) -> Vec<String> {
        if self.max_width == 0 {
            return vec![text.to_string()];
        }
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > self.max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let head: String = word.chars().take(self.max_width).collect();
                word = word.chars().skip(self.max_width).collect();
                lines.push(head);
            }
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > self.max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }
}
