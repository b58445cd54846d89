//! Emacs / compiler style text, one `path:line:col: severity - message`
//! line per issue.
//!
//! Severity mapping: ERROR→`error`, WARNING and TIP→`warning`. On parse
//! `error` reads as ERROR and every other word as WARNING. Code, help and
//! ref travel inside the message grammar.

use super::message::{format_line, parse_line};
use super::{features, report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec};
use crate::error::Result;
use crate::models::issue::{NO_MESSAGE, UNKNOWN_CODE};
use crate::models::{Issue, Report, Severity};
use crate::options::{OptionSpec, ResolvedOptions};
use tracing::debug;

fn to_emacs(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning | Severity::Tip => "warning",
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Emacs;

impl Codec for Emacs {
    fn name(&self) -> &'static str {
        "emacs"
    }

    fn description(&self) -> &'static str {
        "Emacs-style text lines for editors and terminals"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Text
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        DisplayOptions::specs()
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let display = DisplayOptions::from_resolved(options)?;
        let lines: Vec<String> = report
            .issues(true)
            .into_iter()
            .map(|issue| format_line(issue, to_emacs(issue.severity), &display))
            .collect();
        Ok(lines.join("\n"))
    }
}

impl ParsableCodec for Emacs {
    fn parse(&self, input: &str, name: Option<&str>, _options: &ResolvedOptions) -> Result<Report> {
        let mut issues = Vec::new();
        let mut skipped = 0usize;
        for raw in input.lines().filter(|l| !l.trim().is_empty()) {
            let Some(line) = parse_line(raw) else {
                skipped += 1;
                continue;
            };
            let severity = if line.severity == "error" {
                Severity::Error
            } else {
                Severity::Warning
            };
            let parts = line.parts;
            let message = if parts.message.is_empty() {
                NO_MESSAGE.to_string()
            } else {
                parts.message
            };
            let mut issue = Issue::new(
                parts.code.unwrap_or_else(|| UNKNOWN_CODE.to_string()),
                severity,
                message,
                line.path,
            )
            .with_line(line.line)
            .with_column(line.column);
            issue.help = parts.help;
            issue.reference = parts.reference;
            issues.push(issue);
        }
        if skipped > 0 {
            debug!(skipped, "ignored lines that are not emacs diagnostics");
        }
        Ok(Report::from_parsed(report_name(self, None, name), issues))
    }

    fn supports(&self) -> FeatureSet {
        features(&[Feature::IssueLine, Feature::IssueColumn])
    }

    fn supports_extra(&self) -> FeatureSet {
        features(&[
            Feature::IssueRef,
            Feature::IssueHelp,
            Feature::IssueCode,
            Feature::ParsableMessage,
        ])
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
    fn test_generate_lines() {
        let out = Emacs.generate(&sample_report(), &defaults(&Emacs)).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[0],
            "/project/base/src/File1.php:10:5: error - This is a critical error. (#error.rule) (Help message for a critical error)"
        );
        assert!(lines[2].contains(": warning - This is just a helpful tip."));
        assert!(lines[3].starts_with("/project/base/src/File3.php:0:0: warning"));
    }

    #[test]
    fn test_round_trip_with_all_annotations() {
        let report = sample_report();
        let opts = resolve(&Emacs, &[("show-ref", true.into())]);
        let back = Emacs.parse(&Emacs.generate(&report, &opts).unwrap(), None, &opts).unwrap();
        assert_eq!(back.own_issues().len(), 6);
        assert_eq!(back.base_path(), "/project/base/");
        let first = &back.own_issues()[0];
        assert_eq!(first.code, "error.rule");
        assert_eq!(first.message, "This is a critical error.");
        assert_eq!(first.help.as_deref(), Some("Help message for a critical error"));
        assert_eq!(first.reference.as_deref(), Some("https://example.com/error-example"));
        // tips narrow to warnings
        assert_eq!(back.own_issues()[2].severity, Severity::Warning);
        assert_eq!(back.totals().warnings, 4);
    }

    #[test]
    fn test_parse_skips_noise_and_keeps_relative_paths() {
        let input = "\nsrc/File1.php:3:7: error - Broken\nnot a diagnostic\n\nlib/x.php:1:1: notice - Fine (Try again)\n";
        let report = Emacs.parse(input, Some("lint"), &defaults(&Emacs)).unwrap();
        let issues = report.own_issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path, "src/File1.php");
        assert_eq!(issues[0].code, UNKNOWN_CODE);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[1].severity, Severity::Warning);
        assert_eq!(issues[1].help.as_deref(), Some("Try again"));
        assert_eq!(report.name(), "lint");
    }

    #[test]
    fn test_show_code_off() {
        let opts = resolve(&Emacs, &[("show-code", false.into()), ("show-help", false.into())]);
        let out = Emacs.generate(&sample_report(), &opts).unwrap();
        assert_eq!(
            out.lines().next(),
            Some("/project/base/src/File1.php:10:5: error - This is a critical error.")
        );
    }
}
