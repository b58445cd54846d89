//! Language Server Protocol `textDocument/publishDiagnostics` notifications,
//! one per file.
//!
//! Severities: ERROR↔1, WARNING↔2, TIP↔3; hints (4) parse as TIP and any
//! other value as WARNING. LSP positions are 0-based, so line and column are
//! shifted by one in each direction. An unknown line or column (0) is
//! written as position 0 and therefore reads back as 1.

use super::json::{parse_json, render_json, JsonOptions};
use super::{features, report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec, TOOL_NAME};
use crate::error::Result;
use crate::models::issue::{NO_MESSAGE, UNKNOWN_CODE};
use crate::models::{Issue, Report, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";
const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<PublishParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishParams {
    pub uri: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Diagnostic {
    pub range: Option<Range>,
    pub severity: Option<u8>,
    /// LSP allows a string or an integer here.
    pub code: Option<Value>,
    pub source: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_description: Option<CodeDescription>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeDescription {
    pub href: String,
}

fn to_lsp(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 1,
        Severity::Warning => 2,
        Severity::Tip => 3,
    }
}

fn from_lsp(severity: Option<u8>) -> Severity {
    match severity {
        Some(1) => Severity::Error,
        Some(3) | Some(4) => Severity::Tip,
        _ => Severity::Warning,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Lsp;

impl Codec for Lsp {
    fn name(&self) -> &'static str {
        "lsp"
    }

    fn description(&self) -> &'static str {
        "Language Server Protocol publishDiagnostics notifications"
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
        let notifications: Vec<Notification> = report
            .issues_by_file(true)
            .into_iter()
            .map(|group| {
                let diagnostics = group
                    .issues
                    .iter()
                    .map(|issue| {
                        let at = Position {
                            line: issue.line.saturating_sub(1),
                            character: issue.column.saturating_sub(1),
                        };
                        Diagnostic {
                            range: Some(Range { start: at, end: at }),
                            severity: Some(to_lsp(issue.severity)),
                            code: Some(Value::String(issue.code.clone())),
                            source: Some(TOOL_NAME.to_string()),
                            message: issue.message.clone(),
                            code_description: issue
                                .reference
                                .clone()
                                .filter(|_| display.show_ref)
                                .map(|href| CodeDescription { href }),
                        }
                    })
                    .collect();
                Notification {
                    jsonrpc: "2.0".to_string(),
                    method: PUBLISH_DIAGNOSTICS.to_string(),
                    params: Some(PublishParams {
                        uri: format!("{FILE_SCHEME}{}", group.path),
                        diagnostics,
                    }),
                }
            })
            .collect();
        render_json(&notifications, &json)
    }
}

impl ParsableCodec for Lsp {
    fn parse(&self, input: &str, name: Option<&str>, _options: &ResolvedOptions) -> Result<Report> {
        let notifications: Vec<Notification> = parse_json(self, input)?;
        let mut issues = Vec::new();
        for notification in notifications {
            if notification.method != PUBLISH_DIAGNOSTICS {
                continue;
            }
            let Some(params) = notification.params else {
                continue;
            };
            let path = params.uri.strip_prefix(FILE_SCHEME).unwrap_or(&params.uri);
            for diagnostic in params.diagnostics {
                let code = match diagnostic.code {
                    Some(Value::String(c)) if !c.is_empty() => c,
                    Some(Value::Number(n)) => n.to_string(),
                    _ => UNKNOWN_CODE.to_string(),
                };
                let message = if diagnostic.message.trim().is_empty() {
                    NO_MESSAGE.to_string()
                } else {
                    diagnostic.message
                };
                let (line, column) = diagnostic
                    .range
                    .map(|r| (r.start.line.saturating_add(1), r.start.character.saturating_add(1)))
                    .unwrap_or((0, 0));
                let mut issue = Issue::new(code, from_lsp(diagnostic.severity), message, path)
                    .with_line(line)
                    .with_column(column);
                issue.reference = diagnostic.code_description.map(|d| d.href);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::{defaults, resolve};
    use crate::test_support::sample_report;

    #[test]
    fn test_generate_one_notification_per_file() {
        let out = Lsp.generate(&sample_report(), &defaults(&Lsp)).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        let notes = v.as_array().unwrap();
        assert_eq!(notes.len(), 4);
        assert_eq!(notes[0]["method"], PUBLISH_DIAGNOSTICS);
        assert_eq!(notes[0]["params"]["uri"], "file:///project/base/src/File1.php");
        let diag = &notes[0]["params"]["diagnostics"][0];
        assert_eq!(diag["range"]["start"]["line"], 9);
        assert_eq!(diag["range"]["start"]["character"], 4);
        assert_eq!(diag["severity"], 1);
        assert_eq!(diag["source"], TOOL_NAME);
        assert!(diag["codeDescription"].is_null());
    }

    #[test]
    fn test_round_trip() {
        let report = sample_report();
        let opts = resolve(&Lsp, &[("show-ref", true.into())]);
        let back = Lsp.parse(&Lsp.generate(&report, &opts).unwrap(), None, &opts).unwrap();
        assert_eq!(back.totals(), report.totals());
        let first = &back.own_issues()[0];
        assert_eq!(first.path, "/project/base/src/File1.php");
        assert_eq!((first.line, first.column), (10, 5));
        assert_eq!(first.reference.as_deref(), Some("https://example.com/error-example"));
        assert_eq!(back.base_path(), "/project/base/");
    }

    #[test]
    fn test_parse_hints_and_foreign_methods() {
        let input = r#"[
            {"jsonrpc":"2.0","method":"window/logMessage","params":{"uri":"file:///a.c"}},
            {"jsonrpc":"2.0","method":"textDocument/publishDiagnostics","params":{"uri":"file:///w/a.c","diagnostics":[
                {"severity":4,"message":"hint"},
                {"severity":1,"code":1001,"message":"numeric"},
                {"range":{"start":{"line":2,"character":0}},"message":""}
            ]}}
        ]"#;
        let report = Lsp.parse(input, None, &defaults(&Lsp)).unwrap();
        let issues = report.own_issues();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[1].code, "1001");
        assert_eq!(issues[0].severity, Severity::Tip);
        assert_eq!(issues[0].line, 0);
        assert_eq!(issues[0].code, UNKNOWN_CODE);
        assert_eq!(issues[2].severity, Severity::Warning);
        assert_eq!((issues[2].line, issues[2].column), (3, 1));
        assert_eq!(issues[2].message, NO_MESSAGE);
        assert_eq!(issues[2].path, "/w/a.c");
    }

    #[test]
    fn test_parse_saturates_huge_positions() {
        let input = r#"{"jsonrpc":"2.0","method":"textDocument/publishDiagnostics","params":{"uri":"file:///w/a.c","diagnostics":[
            {"range":{"start":{"line":4294967295,"character":4294967295}},"message":"far"}
        ]}}"#;
        let report = Lsp.parse(input, None, &defaults(&Lsp)).unwrap();
        let issue = &report.own_issues()[0];
        assert_eq!((issue.line, issue.column), (u32::MAX, u32::MAX));
    }
}
