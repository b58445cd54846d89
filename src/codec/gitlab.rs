//! GitLab Code Quality JSON.
//!
//! Severities: ERROR↔`critical`, WARNING↔`major`, TIP↔`minor`; any other
//! GitLab level parses as WARNING. Entries without a `location` are
//! skipped on parse. GitLab has no column, so parsed columns are 0.

use super::json::{parse_json, render_json, JsonOptions};
use super::{features, report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec};
use crate::error::Result;
use crate::models::issue::{NO_MESSAGE, UNKNOWN_CODE};
use crate::models::{Issue, Report, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabIssue {
    pub description: String,
    pub check_name: String,
    pub fingerprint: String,
    pub severity: String,
    pub location: Option<GitLabLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabLocation {
    pub path: String,
    pub lines: GitLabLines,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabLines {
    pub begin: u32,
}

/// Stable identity of an issue across runs: hex SHA-256 of path, line,
/// code and message.
pub fn fingerprint(issue: &Issue) -> String {
    let mut hasher = Sha256::new();
    hasher.update(issue.path.as_bytes());
    hasher.update(issue.line.to_string().as_bytes());
    hasher.update(issue.code.as_bytes());
    hasher.update(issue.message.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn to_gitlab(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "critical",
        Severity::Warning => "major",
        Severity::Tip => "minor",
    }
}

fn from_gitlab(severity: &str) -> Severity {
    match severity {
        "critical" => Severity::Error,
        "minor" => Severity::Tip,
        _ => Severity::Warning,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GitLab;

impl Codec for GitLab {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    fn description(&self) -> &'static str {
        "GitLab Code Quality JSON"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Json
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([DisplayOptions::specs(), JsonOptions::specs()])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let json = JsonOptions::from_resolved(options)?;
        let issues: Vec<GitLabIssue> = report
            .issues(true)
            .into_iter()
            .map(|issue| GitLabIssue {
                description: issue.message.clone(),
                check_name: issue.code.clone(),
                fingerprint: fingerprint(issue),
                severity: to_gitlab(issue.severity).to_string(),
                location: Some(GitLabLocation {
                    path: issue.path.clone(),
                    lines: GitLabLines { begin: issue.line },
                }),
            })
            .collect();
        render_json(&issues, &json)
    }
}

impl ParsableCodec for GitLab {
    fn parse(&self, input: &str, name: Option<&str>, _options: &ResolvedOptions) -> Result<Report> {
        let entries: Vec<GitLabIssue> = parse_json(self, input)?;
        let issues = entries
            .into_iter()
            .filter_map(|entry| {
                let location = entry.location?;
                let code = if entry.check_name.is_empty() {
                    UNKNOWN_CODE.to_string()
                } else {
                    entry.check_name
                };
                let message = if entry.description.trim().is_empty() {
                    NO_MESSAGE.to_string()
                } else {
                    entry.description
                };
                Some(
                    Issue::new(code, from_gitlab(&entry.severity), message, location.path)
                        .with_line(location.lines.begin),
                )
            })
            .collect();
        Ok(Report::from_parsed(report_name(self, None, name), issues))
    }

    fn supports(&self) -> FeatureSet {
        features(&[Feature::PreserveSeverity, Feature::IssueLine, Feature::IssueCode])
    }

    fn supports_extra(&self) -> FeatureSet {
        FeatureSet::new()
    }

    fn as_codec(&self) -> &dyn Codec {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::defaults;
    use crate::test_support::sample_report;
    use serde_json::Value;

    #[test]
    fn test_generate_entries() {
        let out = GitLab.generate(&sample_report(), &defaults(&GitLab)).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        let entries = v.as_array().unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0]["check_name"], "error.rule");
        assert_eq!(entries[0]["severity"], "critical");
        assert_eq!(entries[0]["location"]["lines"]["begin"], 10);
        assert_eq!(entries[2]["severity"], "minor");
        assert_eq!(entries[0]["fingerprint"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        let report = sample_report();
        let issues = report.issues(true);
        assert_eq!(fingerprint(issues[0]), fingerprint(issues[0]));
        assert_ne!(fingerprint(issues[0]), fingerprint(issues[1]));
    }

    #[test]
    fn test_round_trip_keeps_severity_but_not_column() {
        let report = sample_report();
        let opts = defaults(&GitLab);
        let back = GitLab.parse(&GitLab.generate(&report, &opts).unwrap(), None, &opts).unwrap();
        assert_eq!(back.totals(), report.totals());
        assert_eq!(back.name(), "Parsed gitlab report");
        let first = &back.own_issues()[0];
        assert_eq!((first.line, first.column), (10, 0));
        assert_eq!(first.help, None);
    }

    #[test]
    fn test_parse_skips_entries_without_location() {
        let input = r#"[{"description":"a","severity":"blocker"},{"description":"b","severity":"info","location":{"path":"/x/y.go","lines":{"begin":2}}}]"#;
        let report = GitLab.parse(input, Some("ci"), &defaults(&GitLab)).unwrap();
        assert_eq!(report.own_issues().len(), 1);
        let issue = &report.own_issues()[0];
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.code, UNKNOWN_CODE);
        assert!(GitLab.parse("{}", None, &defaults(&GitLab)).is_err());
    }
}
