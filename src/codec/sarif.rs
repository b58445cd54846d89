//! SARIF 2.1.0 for code scanning integrations.
//!
//! Levels map one to one: ERROR↔`error`, WARNING↔`warning`, TIP↔`note`;
//! `none` and unknown levels parse as WARNING. Help and ref are stored on
//! the rule, so issues sharing a code share the first issue's help and ref.

use super::json::{parse_json, render_json, JsonOptions};
use super::{features, report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec, TOOL_NAME};
use crate::error::Result;
use crate::models::issue::{NO_MESSAGE, UNKNOWN_CODE};
use crate::models::{Issue, Report, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
pub const SARIF_VERSION: &str = "2.1.0";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifLog {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifRule {
    pub id: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "helpUri", skip_serializing_if = "Option::is_none")]
    pub help_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<SarifMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: Option<String>,
    pub level: Option<String>,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<SarifRegion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SarifRegion {
    #[serde(rename = "startLine", skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(rename = "startColumn", skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
}

/// Default path for results without a location.
pub const UNKNOWN_FILE: &str = "unknown_file";

fn to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Tip => "note",
    }
}

fn from_level(level: Option<&str>) -> Severity {
    match level {
        Some("error") => Severity::Error,
        Some("note") => Severity::Tip,
        _ => Severity::Warning,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sarif;

impl Codec for Sarif {
    fn name(&self) -> &'static str {
        "sarif"
    }

    fn description(&self) -> &'static str {
        "SARIF 2.1.0 for code scanning dashboards"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Json
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([DisplayOptions::specs(), JsonOptions::specs()])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let display = DisplayOptions::from_resolved(options)?;
        let json = JsonOptions::from_resolved(options)?;

        let mut rules: Vec<SarifRule> = Vec::new();
        let mut results = Vec::new();
        for issue in report.issues(true) {
            if !rules.iter().any(|r| r.id == issue.code) {
                rules.push(SarifRule {
                    id: issue.code.clone(),
                    short_description: SarifMessage {
                        text: issue.message.clone(),
                    },
                    help_uri: issue.reference.clone().filter(|_| display.show_ref),
                    help: issue
                        .help
                        .clone()
                        .filter(|_| display.show_help)
                        .map(|text| SarifMessage { text }),
                });
            }
            let region = (issue.line > 0).then(|| SarifRegion {
                start_line: Some(issue.line),
                start_column: (issue.column > 0).then_some(issue.column),
            });
            results.push(SarifResult {
                rule_id: Some(issue.code.clone()),
                level: Some(to_level(issue.severity).to_string()),
                message: SarifMessage {
                    text: issue.message.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: issue.path.clone(),
                        },
                        region,
                    },
                }],
            });
        }

        let log = SarifLog {
            schema: SARIF_SCHEMA.to_string(),
            version: SARIF_VERSION.to_string(),
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: TOOL_NAME.to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        rules,
                    },
                },
                results,
            }],
        };
        render_json(&log, &json)
    }
}

impl ParsableCodec for Sarif {
    fn parse(&self, input: &str, name: Option<&str>, _options: &ResolvedOptions) -> Result<Report> {
        let log: SarifLog = parse_json(self, input)?;
        let mut issues = Vec::new();
        for run in log.runs {
            let rules: HashMap<&str, &SarifRule> = run
                .tool
                .driver
                .rules
                .iter()
                .map(|r| (r.id.as_str(), r))
                .collect();
            for result in &run.results {
                let code = result
                    .rule_id
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .unwrap_or(UNKNOWN_CODE);
                let message = if result.message.text.trim().is_empty() {
                    NO_MESSAGE
                } else {
                    result.message.text.as_str()
                };
                let location = result.locations.first().map(|l| &l.physical_location);
                let path = location
                    .map(|l| l.artifact_location.uri.as_str())
                    .filter(|u| !u.is_empty())
                    .unwrap_or(UNKNOWN_FILE);
                let region = location.and_then(|l| l.region.as_ref());
                let mut issue = Issue::new(code, from_level(result.level.as_deref()), message, path)
                    .with_line(region.and_then(|r| r.start_line).unwrap_or(0))
                    .with_column(region.and_then(|r| r.start_column).unwrap_or(0));
                if let Some(rule) = rules.get(code) {
                    issue.reference = rule.help_uri.clone();
                    issue.help = rule.help.as_ref().map(|h| h.text.clone());
                }
                issues.push(issue);
            }
        }
        Ok(Report::from_parsed(report_name(self, None, name), issues))
    }

    fn supports(&self) -> FeatureSet {
        features(&[
            Feature::PreserveSeverity,
            Feature::IssueLine,
            Feature::IssueColumn,
            Feature::IssueCode,
            Feature::IssueHelp,
            Feature::IssueRef,
        ])
    }

    fn supports_extra(&self) -> FeatureSet {
        FeatureSet::new()
    }

    fn as_codec(&self) -> &dyn Codec {
        self
    }
}
