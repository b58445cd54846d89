//! SonarQube generic issue import format.
//!
//! Severities map one to one: ERROR↔`BLOCKER`, WARNING↔`MAJOR`,
//! TIP↔`MINOR`. Errors are typed `BUG`, everything else `CODE_SMELL`.
//! On parse `CRITICAL` reads as ERROR and `INFO` as TIP; anything else is
//! WARNING.

use super::json::{parse_json, render_json, JsonOptions};
use super::{features, report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec, TOOL_NAME};
use crate::error::Result;
use crate::models::issue::{NO_MESSAGE, UNKNOWN_CODE};
use crate::models::{Issue, Report, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarReport {
    pub issues: Vec<SonarIssue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SonarIssue {
    pub engine_id: String,
    pub rule_id: String,
    pub primary_location: SonarLocation,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SonarLocation {
    pub message: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_range: Option<SonarTextRange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SonarTextRange {
    pub start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
}

fn to_sonar(severity: Severity) -> (&'static str, &'static str) {
    match severity {
        Severity::Error => ("BLOCKER", "BUG"),
        Severity::Warning => ("MAJOR", "CODE_SMELL"),
        Severity::Tip => ("MINOR", "CODE_SMELL"),
    }
}

fn from_sonar(severity: &str) -> Severity {
    match severity {
        "BLOCKER" | "CRITICAL" => Severity::Error,
        "MINOR" | "INFO" => Severity::Tip,
        _ => Severity::Warning,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SonarQube;

impl Codec for SonarQube {
    fn name(&self) -> &'static str {
        "sonarqube"
    }

    fn description(&self) -> &'static str {
        "SonarQube generic external issues JSON"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Json
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([DisplayOptions::specs(), JsonOptions::specs()])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let json = JsonOptions::from_resolved(options)?;
        let issues = report
            .issues(true)
            .into_iter()
            .map(|issue| {
                let (severity, kind) = to_sonar(issue.severity);
                // SonarQube columns are 0-based offsets.
                let text_range = (issue.line > 0).then(|| SonarTextRange {
                    start_line: issue.line,
                    start_column: (issue.column > 0).then(|| issue.column - 1),
                });
                SonarIssue {
                    engine_id: TOOL_NAME.to_string(),
                    rule_id: issue.code.clone(),
                    primary_location: SonarLocation {
                        message: issue.message.clone(),
                        file_path: issue.path.clone(),
                        text_range,
                    },
                    kind: kind.to_string(),
                    severity: severity.to_string(),
                }
            })
            .collect();
        render_json(&SonarReport { issues }, &json)
    }
}

impl ParsableCodec for SonarQube {
    fn parse(&self, input: &str, name: Option<&str>, _options: &ResolvedOptions) -> Result<Report> {
        let doc: SonarReport = parse_json(self, input)?;
        let issues = doc
            .issues
            .into_iter()
            .map(|si| {
                let code = if si.rule_id.is_empty() {
                    UNKNOWN_CODE.to_string()
                } else {
                    si.rule_id
                };
                let location = si.primary_location;
                let message = if location.message.trim().is_empty() {
                    NO_MESSAGE.to_string()
                } else {
                    location.message
                };
                let range = location.text_range.unwrap_or_default();
                Issue::new(code, from_sonar(&si.severity), message, location.file_path)
                .with_line(range.start_line)
                .with_column(range.start_column.map(|c| c.saturating_add(1)).unwrap_or(0))
            })
            .collect();
        Ok(Report::from_parsed(report_name(self, None, name), issues))
    }

    fn supports(&self) -> FeatureSet {
        features(&[
            Feature::PreserveSeverity,
            Feature::IssueLine,
            Feature::IssueColumn,
            Feature::IssueCode,
        ])
    }

    fn supports_extra(&self) -> FeatureSet {
        FeatureSet::new()
    }

    fn as_codec(&self) -> &dyn Codec {
        self
    }
}
