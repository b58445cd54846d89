//! Shared data models: severities, issues, reports and the structural dump.

pub mod dump;
pub mod issue;
pub mod report;

pub use dump::{IssueRecord, IssueSet, ReportDump};
pub use issue::{Issue, IssueLocation};
pub use report::{FileIssues, IssueView, Report, Totals};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Three-level severity with a fixed total order `Error > Warning > Tip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Tip,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Tip];

    /// Stable numeric code used in structural dumps.
    pub fn code(self) -> i64 {
        match self {
            Severity::Error => 5,
            Severity::Warning => 3,
            Severity::Tip => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Tip => "TIP",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            5 => Some(Severity::Error),
            3 => Some(Severity::Warning),
            0 => Some(Severity::Tip),
            _ => None,
        }
    }

    /// Case-insensitive label lookup.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Some(Severity::Error),
            "WARNING" => Some(Severity::Warning),
            "TIP" => Some(Severity::Tip),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeverityRepr {
    Code(i64),
    Label(String),
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match SeverityRepr::deserialize(deserializer)? {
            SeverityRepr::Code(c) => Severity::from_code(c)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown severity code {c}"))),
            SeverityRepr::Label(l) => Severity::from_label(&l)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown severity '{l}'"))),
        }
    }
}
