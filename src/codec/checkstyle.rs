//! Checkstyle XML.
//!
//! Severity mapping: ERROR→`error`, WARNING and TIP→`warning`.
//! Parsing maps `error`→ERROR, `warning`→WARNING, `info`→TIP and anything
//! else to WARNING, so a TIP comes back as a WARNING.

use super::xml::{attr_u32, children_named, parse_xml, render_xml, XmlElement, XmlOptions};
use super::{features, report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec};
use crate::error::Result;
use crate::models::issue::UNKNOWN_CODE;
use crate::models::{Issue, Report, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};
use tracing::debug;

pub const CHECKSTYLE_VERSION: &str = "3.13.3";

#[derive(Debug, Default, Clone, Copy)]
pub struct Checkstyle;

fn to_checkstyle(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning | Severity::Tip => "warning",
    }
}

fn from_checkstyle(level: &str) -> Severity {
    match level {
        "error" => Severity::Error,
        "info" => Severity::Tip,
        _ => Severity::Warning,
    }
}

impl Codec for Checkstyle {
    fn name(&self) -> &'static str {
        "checkstyle"
    }

    fn description(&self) -> &'static str {
        "Checkstyle XML, understood by most CI dashboards"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Xml
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([DisplayOptions::specs(), XmlOptions::specs()])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let display = DisplayOptions::from_resolved(options)?;
        let xml = XmlOptions::from_resolved(options)?;
        let mut root = XmlElement::new("checkstyle").attr("version", CHECKSTYLE_VERSION);
        for group in report.issues_by_file(true) {
            let mut file = XmlElement::new("file").attr("name", group.path);
            for issue in group.issues {
                let mut error = XmlElement::new("error")
                    .attr("line", issue.line)
                    .attr("column", issue.column)
                    .attr("severity", to_checkstyle(issue.severity))
                    .attr("message", &issue.message);
                if display.show_code {
                    error = error.attr("source", &issue.code);
                }
                file.push(error);
            }
            root.push(file);
        }
        Ok(render_xml(&root, &xml))
    }
}

impl ParsableCodec for Checkstyle {
    fn parse(&self, input: &str, name: Option<&str>, _options: &ResolvedOptions) -> Result<Report> {
        let doc = parse_xml(self, input)?;
        let mut issues = Vec::new();
        for file in children_named(doc.root_element(), "file") {
            let path = file.attribute("name").unwrap_or_default();
            for error in children_named(file, "error") {
                let severity = from_checkstyle(error.attribute("severity").unwrap_or_default());
                let code = error
                    .attribute("source")
                    .filter(|s| !s.is_empty())
                    .unwrap_or(UNKNOWN_CODE);
                issues.push(
                    Issue::new(code, severity, error.attribute("message").unwrap_or_default(), path)
                        .with_line(attr_u32(error, "line"))
                        .with_column(attr_u32(error, "column")),
                );
            }
        }
        debug!(count = issues.len(), "parsed checkstyle issues");
        Ok(Report::from_parsed(report_name(self, None, name), issues))
    }

    fn supports(&self) -> FeatureSet {
        features(&[Feature::IssueLine, Feature::IssueColumn, Feature::IssueCode])
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
    fn test_generate_structure() {
        let report = sample_report();
        let out = Checkstyle.generate(&report, &defaults(&Checkstyle)).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        let doc = roxmltree::Document::parse(&out).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "checkstyle");
        assert_eq!(root.attribute("version"), Some("3.13.3"));
        let files: Vec<_> = children_named(root, "file").collect();
        assert_eq!(files.len(), 4);
        assert_eq!(files[0].attribute("name"), Some("/project/base/src/File1.php"));
        let first = children_named(files[0], "error").next().unwrap();
        assert_eq!(first.attribute("severity"), Some("error"));
        assert_eq!(first.attribute("source"), Some("error.rule"));
        assert_eq!(first.attribute("line"), Some("10"));
    }

    #[test]
    fn test_tip_narrows_to_warning_on_round_trip() {
        let mut report = Report::new("tips", "/w");
        report.start();
        report
            .add_issue(Issue::new("t", Severity::Tip, "hint", "a.rs").with_line(1))
            .unwrap();
        let opts = defaults(&Checkstyle);
        let out = Checkstyle.generate(&report, &opts).unwrap();
        assert!(out.contains("severity=\"warning\""));
        let back = Checkstyle.parse(&out, None, &opts).unwrap();
        assert_eq!(back.own_issues()[0].severity, Severity::Warning);
    }

    #[test]
    fn test_parse_severity_vocabulary_and_defaults() {
        let input = r#"<?xml version="1.0"?>
<checkstyle version="8.0">
  <file name="/src/a.java">
    <error line="3" severity="info" message="note"/>
    <error severity="ignore" message="odd" source="x.y"/>
    <error line="7" column="2" severity="error" message="bad" source="z"/>
  </file>
</checkstyle>"#;
        let report = Checkstyle.parse(input, Some("ci"), &defaults(&Checkstyle)).unwrap();
        let sev: Vec<Severity> = report.own_issues().iter().map(|i| i.severity).collect();
        assert_eq!(sev, vec![Severity::Tip, Severity::Warning, Severity::Error]);
        assert_eq!(report.own_issues()[0].code, "unknown");
        assert_eq!(report.own_issues()[1].line, 0);
        assert_eq!(report.name(), "ci");
        assert_eq!(report.base_path(), "/src/");
    }

    #[test]
    fn test_parse_default_name_and_invalid_xml() {
        let opts = defaults(&Checkstyle);
        let report = Checkstyle.parse("<checkstyle/>", None, &opts).unwrap();
        assert_eq!(report.name(), "Parsed checkstyle report");
        let err = Checkstyle.parse("<checkstyle>", None, &opts).unwrap_err();
        assert!(matches!(err, crate::error::ReportError::Format { .. }));
    }

    #[test]
    fn test_show_code_off_drops_source() {
        let opts = resolve(&Checkstyle, &[("show-code", false.into())]);
        let out = Checkstyle.generate(&sample_report(), &opts).unwrap();
        assert!(!out.contains("source="));
    }
}
