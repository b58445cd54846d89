//! PHP_CodeSniffer JSON report.
//!
//! Messages are typed `ERROR` or `WARNING`; tips are counted and typed as
//! warnings. The numeric `severity` field carries the model's severity code
//! but is not consulted on parse. Help and ref are appended to the message
//! and only split back out when `parse-message` is enabled.

use super::json::{parse_json, render_json, JsonOptions};
use super::message::{format_message, parse_message, MessageOptions};
use super::{features, report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec};
use crate::error::{ReportError, Result};
use crate::models::issue::{NO_MESSAGE, UNKNOWN_CODE};
use crate::models::{Issue, Report, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhpcsTotals {
    pub errors: usize,
    pub warnings: usize,
    pub fixable: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhpcsFile {
    pub errors: usize,
    pub warnings: usize,
    pub messages: Vec<PhpcsMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhpcsMessage {
    pub message: String,
    pub severity: i64,
    pub fixable: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub line: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Document shape; `files` keeps the document's path order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhpcsReport {
    pub totals: PhpcsTotals,
    pub files: Map<String, Value>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Phpcs;

impl Codec for Phpcs {
    fn name(&self) -> &'static str {
        "phpcs"
    }

    fn description(&self) -> &'static str {
        "PHP_CodeSniffer JSON report"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Json
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([
            DisplayOptions::specs(),
            JsonOptions::specs(),
            MessageOptions::specs(false),
        ])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let display = DisplayOptions::from_resolved(options)?;
        let json = JsonOptions::from_resolved(options)?;
        let totals = report.totals();

        let mut files = Map::new();
        for group in report.issues_by_file(true) {
            let mut file = PhpcsFile::default();
            for issue in group.issues {
                let kind = if issue.severity == Severity::Error {
                    file.errors += 1;
                    "ERROR"
                } else {
                    file.warnings += 1;
                    "WARNING"
                };
                file.messages.push(PhpcsMessage {
                    message: format_message(issue, &display, false),
                    severity: issue.severity.code(),
                    fixable: false,
                    kind: kind.to_string(),
                    line: issue.line,
                    column: issue.column,
                    source: display.show_code.then(|| issue.code.clone()),
                });
            }
            let value = serde_json::to_value(&file)
                .map_err(|e| ReportError::format(self.name(), e.to_string()))?;
            files.insert(group.path.to_string(), value);
        }

        let doc = PhpcsReport {
            totals: PhpcsTotals {
                errors: totals.errors,
                warnings: totals.warnings + totals.tips,
                fixable: 0,
            },
            files,
        };
        render_json(&doc, &json)
    }
}

impl ParsableCodec for Phpcs {
    fn parse(&self, input: &str, name: Option<&str>, options: &ResolvedOptions) -> Result<Report> {
        let message_opts = MessageOptions::from_resolved(options)?;
        let doc: Value = parse_json(self, input)?;
        let files = doc
            .get("files")
            .and_then(Value::as_object)
            .ok_or_else(|| ReportError::format(self.name(), "missing \"files\" object"))?;

        let mut issues = Vec::new();
        for (path, entry) in files {
            // Entries without a messages list are ignored, as phpcs itself does.
            let Some(messages) = entry.get("messages").and_then(Value::as_array) else {
                continue;
            };
            for raw in messages {
                let msg: PhpcsMessage = serde_json::from_value(raw.clone()).map_err(|e| {
                    ReportError::format(self.name(), format!("invalid message in {path}: {e}"))
                })?;
                let severity = if msg.kind.eq_ignore_ascii_case("ERROR") {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                let mut code = msg.source.filter(|s| !s.is_empty());
                let mut message = msg.message;
                let (mut help, mut reference) = (None, None);
                if message_opts.parse_message {
                    let parts = parse_message(&message);
                    message = parts.message;
                    help = parts.help;
                    reference = parts.reference;
                    code = code.or(parts.code);
                }
                if message.trim().is_empty() {
                    message = NO_MESSAGE.to_string();
                }
                let mut issue = Issue::new(
                    code.unwrap_or_else(|| UNKNOWN_CODE.to_string()),
                    severity,
                    message,
                    path.as_str(),
                )
                .with_line(msg.line)
                .with_column(msg.column);
                issue.help = help;
                issue.reference = reference;
                issues.push(issue);
            }
        }
        Ok(Report::from_parsed(report_name(self, None, name), issues))
    }

    fn supports(&self) -> FeatureSet {
        features(&[Feature::IssueLine, Feature::IssueColumn, Feature::IssueCode])
    }

    fn supports_extra(&self) -> FeatureSet {
        features(&[Feature::IssueHelp, Feature::IssueRef, Feature::ParsableMessage])
    }

    fn as_codec(&self) -> &dyn Codec {
        self
    }
}
