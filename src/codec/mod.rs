//! Codec contract: the pluggable unit converting a `Report` to and from one
//! external format.
//!
//! Codecs are stateless; configuration arrives as [`ResolvedOptions`] and
//! each codec builds the feature structs it composes (`DisplayOptions`,
//! `JsonOptions`, `XmlOptions`, `RichOptions`, `MessageOptions`) from it.
//! Formats with a narrower severity vocabulary than the model document
//! their fixed mapping next to `generate` and its inverse next to `parse`.

pub mod checkstyle;
pub mod emacs;
pub mod gitlab;
pub mod info;
pub mod json;
pub mod junit;
pub mod lsp;
pub mod message;
pub mod phpcs;
pub mod raw;
pub mod raw_xml;
pub mod registry;
pub mod rich;
pub mod sarif;
pub mod sonarqube;
pub mod xml;

pub use registry::{ConfiguredCodec, RegisteredCodec, Registry};

use crate::error::Result;
use crate::models::Report;
use crate::options::{self, OptionScope, OptionSpec, ResolvedOptions};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Tool name written into formats that carry one.
pub const TOOL_NAME: &str = "issue-reporter";

/// Broad kind of text a codec produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Json,
    Xml,
    Text,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputKind::Json => "json",
            OutputKind::Xml => "xml",
            OutputKind::Text => "txt",
        })
    }
}

/// Capability a parsable codec can round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    ParsableMessage,
    PreserveSeverity,
    ReportName,
    ReportBasepath,
    ReportTotalTime,
    ReportTimeEnd,
    ReportTimeStart,
    IssueLine,
    IssueColumn,
    IssueHelp,
    IssueRef,
    IssueExtra,
    IssueCode,
}

pub type FeatureSet = BTreeSet<Feature>;

impl Feature {
    pub const ALL: [Feature; 13] = [
        Feature::ParsableMessage,
        Feature::PreserveSeverity,
        Feature::ReportName,
        Feature::ReportBasepath,
        Feature::ReportTotalTime,
        Feature::ReportTimeEnd,
        Feature::ReportTimeStart,
        Feature::IssueLine,
        Feature::IssueColumn,
        Feature::IssueHelp,
        Feature::IssueRef,
        Feature::IssueExtra,
        Feature::IssueCode,
    ];

    pub fn all() -> FeatureSet {
        Feature::ALL.into_iter().collect()
    }

    pub fn slug(self) -> &'static str {
        match self {
            Feature::ParsableMessage => "parsable-message",
            Feature::PreserveSeverity => "preserve-severity",
            Feature::ReportName => "report-name",
            Feature::ReportBasepath => "report-basepath",
            Feature::ReportTotalTime => "report-total-time",
            Feature::ReportTimeEnd => "report-time-end",
            Feature::ReportTimeStart => "report-time-start",
            Feature::IssueLine => "issue-line",
            Feature::IssueColumn => "issue-column",
            Feature::IssueHelp => "issue-help",
            Feature::IssueRef => "issue-ref",
            Feature::IssueExtra => "issue-extra",
            Feature::IssueCode => "issue-code",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Feature::ParsableMessage => "help and ref are embedded in the message text",
            Feature::PreserveSeverity => "preserves all three severity levels",
            Feature::ReportName => "includes the report name",
            Feature::ReportBasepath => "includes the report base path",
            Feature::ReportTotalTime => "includes the total time",
            Feature::ReportTimeEnd => "includes the end time",
            Feature::ReportTimeStart => "includes the start time",
            Feature::IssueLine => "includes the line",
            Feature::IssueColumn => "includes the column",
            Feature::IssueHelp => "includes the help text",
            Feature::IssueRef => "includes the reference link",
            Feature::IssueExtra => "includes extra metadata",
            Feature::IssueCode => "includes the issue code",
        }
    }
}

pub(crate) fn features(list: &[Feature]) -> FeatureSet {
    list.iter().copied().collect()
}

/// A named serializer from a report to one external format.
pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn kind(&self) -> OutputKind;

    /// Declared options in bare form, common display options included.
    fn option_specs(&self) -> Vec<OptionSpec>;

    fn options_definition(&self, scope: OptionScope) -> Vec<OptionSpec> {
        options::expand(self.name(), &self.option_specs(), scope)
    }

    /// Render `report`. Must not mutate it.
    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String>;

    fn default_report_name(&self) -> String {
        format!("Parsed {} report", self.name())
    }
}

/// A codec that can also read its format back into a report.
pub trait ParsableCodec: Codec {
    /// Decode `input`. `name` is used when the document carries no report
    /// name of its own. Invalid syntax is a format error and no partial
    /// report is returned.
    fn parse(&self, input: &str, name: Option<&str>, options: &ResolvedOptions) -> Result<Report>;

    /// Features round-tripped natively.
    fn supports(&self) -> FeatureSet;

    /// Features stored in non-standard places other consumers will ignore.
    fn supports_extra(&self) -> FeatureSet;

    fn as_codec(&self) -> &dyn Codec;
}

/// Report name for a parsed document: its own name, then the caller's
/// fallback, then the codec default.
pub(crate) fn report_name(
    codec: &dyn Codec,
    from_document: Option<&str>,
    fallback: Option<&str>,
) -> String {
    from_document
        .filter(|s| !s.trim().is_empty())
        .or(fallback.filter(|s| !s.trim().is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| codec.default_report_name())
}

/// Visibility toggles shared by every codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_ref: bool,
    pub show_help: bool,
    pub show_code: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            show_ref: false,
            show_help: true,
            show_code: true,
        }
    }
}

impl DisplayOptions {
    pub fn specs() -> Vec<OptionSpec> {
        vec![
            OptionSpec::flag("show-ref", "Include the reference link of each issue", false),
            OptionSpec::flag("show-help", "Include the help text of each issue", true),
            OptionSpec::flag("show-code", "Include the code of each issue", true),
        ]
    }

    pub fn from_resolved(options: &ResolvedOptions) -> Result<Self> {
        Ok(DisplayOptions {
            show_ref: options.flag("show-ref")?,
            show_help: options.flag("show-help")?,
            show_code: options.flag("show-code")?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_all_covers_every_variant() {
        let all = Feature::all();
        assert_eq!(all.len(), 13);
        assert!(all.contains(&Feature::IssueExtra));
        let slugs: BTreeSet<&str> = all.iter().map(|f| f.slug()).collect();
        assert_eq!(slugs.len(), 13);
    }

    #[test]
    fn test_display_defaults() {
        let d = DisplayOptions::default();
        assert!(!d.show_ref);
        assert!(d.show_help);
        assert!(d.show_code);
    }
}
