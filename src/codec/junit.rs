//! JUnit XML, one `testsuite` per file and one failing `testcase` per issue.
//!
//! The severity label, position, extra metadata and (when enabled) help and
//! ref are written as `<property>` entries. Parsing reads back severity,
//! line and column from those properties but deliberately ignores the help,
//! ref and extra entries, so this format's round trip is lossier than its
//! output suggests. The failure text is a location-prefixed message line;
//! with `parse-message` on, its message and position refine the parsed
//! issue. Documents without a severity property parse as ERROR.

use super::message::{format_line, parse_line, MessageOptions};
use super::xml::{attr_u32, children_named, first_child, parse_xml, render_xml, XmlElement, XmlOptions};
use super::{features, report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec};
use crate::error::{ReportError, Result};
use crate::models::issue::UNKNOWN_CODE;
use crate::models::{Issue, Report, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};

#[derive(Debug, Default, Clone, Copy)]
pub struct Junit;

impl Codec for Junit {
    fn name(&self) -> &'static str {
        "junit"
    }

    fn description(&self) -> &'static str {
        "JUnit XML representation for static analysis reports"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Xml
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([
            DisplayOptions::specs(),
            XmlOptions::specs(),
            MessageOptions::specs(true),
        ])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let display = DisplayOptions::from_resolved(options)?;
        let xml = XmlOptions::from_resolved(options)?;
        let totals = report.totals();
        let mut root = XmlElement::new("testsuites")
            .attr("failures", totals.errors + totals.warnings + totals.tips)
            .attr("errors", totals.errors)
            .attr("name", report.name())
            .attr("time", report.total_time().map(|t| t.to_string()).unwrap_or_default())
            .attr("timestamp", report.time_end().map(|t| t.round() as i64).unwrap_or(0));

        for group in report.issues_by_file(true) {
            let count = group.issues.len();
            let mut suite = XmlElement::new("testsuite")
                .attr("name", group.path)
                .attr("tests", count)
                .attr("failures", count)
                .attr("file", group.path);
            for issue in group.issues {
                let extra = serde_json::to_string(&issue.extra)
                    .map_err(|e| ReportError::format(self.name(), e.to_string()))?;
                let mut props = vec![
                    ("severity", issue.severity.label().to_string()),
                    ("line", issue.line.to_string()),
                    ("column", issue.column.to_string()),
                    ("extra", extra),
                ];
                if display.show_help {
                    props.push(("help", issue.help.clone().unwrap_or_default()));
                }
                if display.show_ref {
                    props.push(("ref", issue.reference.clone().unwrap_or_default()));
                }

                let mut failure = XmlElement::new("failure");
                if display.show_code {
                    failure = failure.attr("type", &issue.code);
                }
                let failure = failure
                    .attr("message", &issue.message)
                    .text(format_line(issue, issue.severity.label(), &display));

                let mut properties = XmlElement::new("properties");
                for (key, value) in props {
                    properties.push(XmlElement::new("property").attr("name", key).attr("value", value));
                }

                let case_name = if display.show_code { issue.code.as_str() } else { group.path };
                suite.push(
                    XmlElement::new("testcase")
                        .attr("name", case_name)
                        .attr("file", group.path)
                        .attr("line", issue.line)
                        .child(failure)
                        .child(properties),
                );
            }
            root.push(suite);
        }
        Ok(render_xml(&root, &xml))
    }
}

impl ParsableCodec for Junit {
    fn parse(&self, input: &str, name: Option<&str>, options: &ResolvedOptions) -> Result<Report> {
        let message_opts = MessageOptions::from_resolved(options)?;
        let doc = parse_xml(self, input)?;
        let root = doc.root_element();
        // A bare <testsuite> document is accepted as a single suite.
        let suites: Vec<_> = if root.tag_name().name() == "testsuite" {
            vec![root]
        } else {
            children_named(root, "testsuite").collect()
        };

        let mut issues = Vec::new();
        for suite in suites {
            let path = suite
                .attribute("file")
                .or_else(|| suite.attribute("name"))
                .unwrap_or_default();
            for case in children_named(suite, "testcase") {
                let Some(failure) = first_child(case, "failure").or_else(|| first_child(case, "error")) else {
                    continue;
                };
                let mut message = failure
                    .attribute("message")
                    .or_else(|| failure.text())
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                let code = failure
                    .attribute("type")
                    .filter(|t| !t.is_empty())
                    .unwrap_or(UNKNOWN_CODE);
                let mut line = attr_u32(case, "line");
                let mut column = 0;
                let mut severity = Severity::Error;

                if message_opts.parse_message {
                    if let Some(parsed) = failure.text().and_then(parse_line) {
                        if !parsed.parts.message.is_empty() {
                            message = parsed.parts.message;
                        }
                        if parsed.line > 0 {
                            line = parsed.line;
                        }
                        if parsed.column > 0 {
                            column = parsed.column;
                        }
                    }
                }

                if let Some(props) = first_child(case, "properties") {
                    for prop in children_named(props, "property") {
                        let value = prop.attribute("value").unwrap_or_default();
                        match prop.attribute("name") {
                            Some("severity") => {
                                severity = Severity::from_label(value).unwrap_or(Severity::Error)
                            }
                            Some("line") => line = value.trim().parse().unwrap_or(line),
                            Some("column") => column = value.trim().parse().unwrap_or(column),
                            _ => {}
                        }
                    }
                }

                issues.push(
                    Issue::new(code, severity, message, path)
                        .with_line(line)
                        .with_column(column),
                );
            }
        }

        let doc_name = if root.tag_name().name() == "testsuites" {
            root.attribute("name")
        } else {
            None
        };
        let mut report = Report::from_parsed(report_name(self, doc_name, name), issues);
        if let Some(ts) = root.attribute("timestamp").and_then(|t| t.parse::<f64>().ok()) {
            report.set_times(ts, ts);
        }
        if let Some(time) = root.attribute("time").and_then(|t| t.parse::<f64>().ok()) {
            report.set_total_time(time);
        }
        Ok(report)
    }

    fn supports(&self) -> FeatureSet {
        features(&[
            Feature::ReportName,
            Feature::IssueLine,
            Feature::IssueColumn,
            Feature::IssueCode,
        ])
    }

    fn supports_extra(&self) -> FeatureSet {
        features(&[Feature::PreserveSeverity, Feature::ReportTotalTime])
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
    fn test_generate_root_and_suites() {
        let report = sample_report();
        let out = Junit.generate(&report, &defaults(&Junit)).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        let doc = roxmltree::Document::parse(&out).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "testsuites");
        assert_eq!(root.attribute("name"), Some("Test Report"));
        assert_eq!(root.attribute("failures"), Some("6"));
        assert_eq!(root.attribute("errors"), Some("2"));
        assert_eq!(root.attribute("time"), Some("10000"));

        let suites: Vec<_> = children_named(root, "testsuite").collect();
        assert_eq!(suites.len(), 4);
        assert_eq!(suites[0].attribute("tests"), Some("3"));
        let case = first_child(suites[0], "testcase").unwrap();
        assert_eq!(case.attribute("name"), Some("error.rule"));
        let failure = first_child(case, "failure").unwrap();
        assert_eq!(failure.attribute("type"), Some("error.rule"));
        assert_eq!(
            failure.text(),
            Some("/project/base/src/File1.php:10:5: ERROR - This is a critical error. (#error.rule) (Help message for a critical error)")
        );
    }

    #[test]
    fn test_round_trip_keeps_severity_and_position() {
        let report = sample_report();
        let opts = defaults(&Junit);
        let out = Junit.generate(&report, &opts).unwrap();
        let back = Junit.parse(&out, None, &opts).unwrap();
        assert_eq!(back.name(), "Test Report");
        assert_eq!(back.base_path(), "/project/base/");
        assert_eq!(back.totals(), report.totals());
        let first = &back.own_issues()[0];
        assert_eq!(first.code, "error.rule");
        assert_eq!(first.message, "This is a critical error.");
        assert_eq!((first.line, first.column), (10, 5));
        let tip = back.own_issues().iter().find(|i| i.code == "tip.rule").unwrap();
        assert_eq!(tip.severity, Severity::Tip);
        assert_eq!(back.total_time(), Some(10000.0));
    }

    #[test]
    fn test_round_trip_drops_help_ref_and_extra() {
        let mut report = sample_report();
        let mut child = Report::new("c", "/project/base");
        child.start();
        let mut issue = Issue::new("x", Severity::Error, "m", "src/File9.php").with_help("h").with_ref("r");
        issue.add_extra("k", "v");
        child.add_issue(issue).unwrap();
        report.merge_in([child]);

        let opts = resolve(&Junit, &[("show-ref", true.into())]);
        let out = Junit.generate(&report, &opts).unwrap();
        assert!(out.contains("name=\"help\" value=\"h\""));
        assert!(out.contains("name=\"ref\" value=\"r\""));
        let back = Junit.parse(&out, None, &opts).unwrap();
        for issue in back.issues(true) {
            assert_eq!(issue.help, None);
            assert_eq!(issue.reference, None);
            assert!(issue.extra.is_empty());
        }
    }

    #[test]
    fn test_parse_foreign_document() {
        let input = r#"<testsuite name="phpunit"><testcase name="t" line="4"><failure message="boom"/></testcase><testcase name="ok"/></testsuite>"#;
        let report = Junit.parse(input, Some("fallback"), &defaults(&Junit)).unwrap();
        assert_eq!(report.own_issues().len(), 1);
        let issue = &report.own_issues()[0];
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.code, "unknown");
        assert_eq!(issue.line, 4);
        assert_eq!(report.name(), "fallback");
    }
}
