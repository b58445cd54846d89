//! A single finding.

use super::Severity;
use serde::Serialize;
use serde_json::{Map, Value};

/// Code used when a parsed document carries no rule identifier.
pub const UNKNOWN_CODE: &str = "unknown";

/// Message used when a parsed document carries no message text.
pub const NO_MESSAGE: &str = "No message provided";

/// Placeholder path meaning "no path given"; resolves to the report base path.
pub const NO_PATH: &str = ".";

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One finding with a code, severity, message and location.
///
/// `path` is rewritten by the owning [`super::Report`] when the issue is
/// attached; `relative_path` is derived from it and never serialized.
pub struct Issue {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub path: String,
    #[serde(skip)]
    pub relative_path: String,
    pub line: u32,
    pub column: u32,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub help: Option<String>,
    pub extra: Map<String, Value>,
}

/// Optional location and annotations for the `Report::issue` helpers.
#[derive(Debug, Clone, Default)]
pub struct IssueLocation {
    pub path: Option<String>,
    pub line: u32,
    pub column: u32,
    pub help: Option<String>,
    pub reference: Option<String>,
}

impl IssueLocation {
    pub fn at(path: impl Into<String>, line: u32, column: u32) -> Self {
        IssueLocation {
            path: Some(path.into()),
            line,
            column,
            ..Default::default()
        }
    }
}

impl Issue {
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Issue {
            code: code.into(),
            severity,
            message: message.into(),
            path: path.into(),
            relative_path: String::new(),
            line: 0,
            column: 0,
            reference: None,
            help: None,
            extra: Map::new(),
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Namespace the code, e.g. `rule` becomes `tool.rule`. An empty code
    /// becomes the bare prefix.
    pub fn add_code_prefix(&mut self, prefix: &str) {
        self.code = if self.code.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}.{}", self.code)
        };
    }

    pub fn add_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Trim whitespace from every textual field. Empty annotations become `None`.
    pub(crate) fn trim_fields(&mut self) {
        fn trim_in_place(s: &mut String) {
            let t = s.trim();
            if t.len() != s.len() {
                *s = t.to_string();
            }
        }
        fn trim_opt(o: &mut Option<String>) {
            if let Some(s) = o.as_mut() {
                trim_in_place(s);
                if s.is_empty() {
                    *o = None;
                }
            }
        }
        trim_in_place(&mut self.code);
        trim_in_place(&mut self.message);
        trim_in_place(&mut self.path);
        trim_in_place(&mut self.relative_path);
        trim_opt(&mut self.help);
        trim_opt(&mut self.reference);
    }
}
