//! Lossless XML dump of the whole report tree.
//!
//! ```xml
//! <report name=".." basePath=".." timeStart=".." timeEnd=".." time=".."
//!         errors=".." warnings=".." tips=".." files="..">
//!   <issues>
//!     <issue>
//!       <code/><severity/><message/><path/><line/><column/><ref/><help/>
//!       <extra><item key="..">json value</item></extra>
//!     </issue>
//!   </issues>
//!   <subReports><report ..>..</report></subReports>
//! </report>
//! ```
//!
//! Severity is written as its numeric code; extra values as JSON text. The
//! totals attributes are informational and recomputed on parse.

use super::xml::{children_named, first_child, parse_xml, render_xml, XmlElement, XmlOptions};
use super::{report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec};
use crate::error::{ReportError, Result};
use crate::models::{Issue, IssueRecord, IssueSet, Report, ReportDump, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};
use roxmltree::Node;
use serde_json::{Map, Value};

#[derive(Debug, Default, Clone, Copy)]
pub struct RawXml;

fn leaf(name: &str, text: impl ToString) -> XmlElement {
    XmlElement::new(name).text(text.to_string())
}

fn issue_element(issue: &Issue) -> Result<XmlElement> {
    let mut el = XmlElement::new("issue")
        .child(leaf("code", &issue.code))
        .child(leaf("severity", issue.severity.code()))
        .child(leaf("message", &issue.message))
        .child(leaf("path", &issue.path))
        .child(leaf("line", issue.line))
        .child(leaf("column", issue.column));
    if let Some(reference) = &issue.reference {
        el.push(leaf("ref", reference));
    }
    if let Some(help) = &issue.help {
        el.push(leaf("help", help));
    }
    if !issue.extra.is_empty() {
        let mut extra = XmlElement::new("extra");
        for (key, value) in &issue.extra {
            let json = serde_json::to_string(value)
                .map_err(|e| ReportError::format("rawxml", e.to_string()))?;
            extra.push(XmlElement::new("item").attr("key", key).text(json));
        }
        el.push(extra);
    }
    Ok(el)
}

fn report_element(report: &Report) -> Result<XmlElement> {
    let totals = report.totals();
    let mut el = XmlElement::new("report")
        .attr("name", report.name())
        .attr("basePath", report.base_path());
    if let Some(start) = report.time_start() {
        el = el.attr("timeStart", start);
    }
    if let Some(end) = report.time_end() {
        el = el.attr("timeEnd", end);
    }
    if let Some(time) = report.total_time() {
        el = el.attr("time", time);
    }
    el = el
        .attr("errors", totals.errors)
        .attr("warnings", totals.warnings)
        .attr("tips", totals.tips)
        .attr("files", totals.files);

    let mut issues = XmlElement::new("issues");
    for issue in report.own_issues() {
        issues.push(issue_element(issue)?);
    }
    el.push(issues);

    if !report.sub_reports().is_empty() {
        let mut subs = XmlElement::new("subReports");
        for sub in report.sub_reports() {
            subs.push(report_element(sub)?);
        }
        el.push(subs);
    }
    Ok(el)
}

fn leaf_text(node: Node<'_, '_>, name: &'static str) -> Option<String> {
    first_child(node, name).map(|n| n.text().unwrap_or_default().to_string())
}

fn float_attr(node: Node<'_, '_>, name: &str) -> Option<f64> {
    node.attribute(name).and_then(|v| v.trim().parse().ok())
}

fn read_severity(text: &str) -> Result<Severity> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .and_then(Severity::from_code)
        .or_else(|| Severity::from_label(text))
        .ok_or_else(|| ReportError::format("rawxml", format!("unknown severity '{text}'")))
}

fn read_issue(node: Node<'_, '_>) -> Result<IssueRecord> {
    let severity = leaf_text(node, "severity")
        .map(|s| read_severity(&s))
        .transpose()?;
    let number = |name: &'static str| -> Result<Option<u32>> {
        leaf_text(node, name)
            .map(|s| {
                s.trim()
                    .parse::<u32>()
                    .map_err(|_| ReportError::format("rawxml", format!("invalid {name} '{s}'")))
            })
            .transpose()
    };

    let mut extra = Map::new();
    if let Some(items) = first_child(node, "extra") {
        for item in children_named(items, "item") {
            let key = item.attribute("key").unwrap_or_default().to_string();
            let text = item.text().unwrap_or_default();
            // Producers that wrote plain text instead of JSON keep it as a string.
            let value = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
            extra.insert(key, value);
        }
    }

    Ok(IssueRecord {
        code: leaf_text(node, "code"),
        severity,
        message: leaf_text(node, "message"),
        path: leaf_text(node, "path"),
        line: number("line")?,
        column: number("column")?,
        reference: leaf_text(node, "ref"),
        help: leaf_text(node, "help"),
        extra,
    })
}

fn read_report(node: Node<'_, '_>) -> Result<ReportDump> {
    let mut records = Vec::new();
    if let Some(issues) = first_child(node, "issues") {
        for issue in children_named(issues, "issue") {
            records.push(read_issue(issue)?);
        }
    }
    let mut sub_reports = Vec::new();
    if let Some(subs) = first_child(node, "subReports") {
        for sub in children_named(subs, "report") {
            sub_reports.push(read_report(sub)?);
        }
    }
    Ok(ReportDump {
        name: node.attribute("name").map(str::to_string),
        base_path: node.attribute("basePath").map(str::to_string),
        issues: Some(IssueSet::Flat(records)),
        sub_reports,
        time_start: float_attr(node, "timeStart"),
        time_end: float_attr(node, "timeEnd"),
        total_time: float_attr(node, "time"),
    })
}

impl Codec for RawXml {
    fn name(&self) -> &'static str {
        "rawxml"
    }

    fn description(&self) -> &'static str {
        "Complete XML representation of the report tree"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Xml
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([DisplayOptions::specs(), XmlOptions::specs()])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let xml = XmlOptions::from_resolved(options)?;
        Ok(render_xml(&report_element(report)?, &xml))
    }
}

impl ParsableCodec for RawXml {
    fn parse(&self, input: &str, name: Option<&str>, _options: &ResolvedOptions) -> Result<Report> {
        let doc = parse_xml(self, input)?;
        let root = doc.root_element();
        if root.tag_name().name() != "report" {
            return Err(ReportError::format(
                self.name(),
                format!("root element must be 'report', found '{}'", root.tag_name().name()),
            ));
        }
        let mut dump = read_report(root)?;
        dump.name = Some(report_name(self, dump.name.as_deref(), name));
        Report::from_dump(dump)
    }

    fn supports(&self) -> FeatureSet {
        Feature::all()
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

    fn with_child() -> Report {
        let mut report = sample_report();
        let mut child = Report::new("child", "/project/base/lib");
        child.start();
        let mut issue = Issue::new("c.rule", Severity::Tip, "Child <tip> & more", "a.php").with_line(3);
        issue.add_extra("fixable", true);
        issue.add_extra("tags", serde_json::json!(["a", "b"]));
        child.add_issue(issue).unwrap();
        report.merge_in([child]);
        report
    }

    #[test]
    fn test_generate_structure() {
        let out = RawXml.generate(&with_child(), &defaults(&RawXml)).unwrap();
        let doc = roxmltree::Document::parse(&out).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("name"), Some("Test Report"));
        assert_eq!(root.attribute("basePath"), Some("/project/base/"));
        assert_eq!(root.attribute("errors"), Some("2"));
        assert_eq!(root.attribute("tips"), Some("2"));
        let issues: Vec<_> = children_named(first_child(root, "issues").unwrap(), "issue").collect();
        assert_eq!(issues.len(), 6);
        assert_eq!(leaf_text(issues[0], "severity").as_deref(), Some("5"));
        let subs = first_child(root, "subReports").unwrap();
        assert_eq!(children_named(subs, "report").count(), 1);
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let report = with_child();
        for pretty in [false, true] {
            let opts = resolve(&RawXml, &[("pretty", pretty.into())]);
            let back = RawXml.parse(&RawXml.generate(&report, &opts).unwrap(), None, &opts).unwrap();
            assert_eq!(back.name(), "Test Report");
            assert_eq!(back.totals(), report.totals());
            assert_eq!(back.total_time(), Some(10000.0));
            assert_eq!(back.own_issues(), report.own_issues());
            let child = back.sub_report("child").unwrap();
            assert_eq!(child.own_issues(), report.sub_report("child").unwrap().own_issues());
        }
    }

    #[test]
    fn test_wrong_root_is_format_error() {
        let err = RawXml.parse("<checkstyle/>", None, &defaults(&RawXml)).unwrap_err();
        assert!(matches!(err, ReportError::Format { ref message, .. } if message.contains("report")));
    }

    #[test]
    fn test_bad_severity_is_format_error() {
        let input = r#"<report name="r" basePath="/"><issues><issue><code>c</code><severity>loud</severity><message>m</message><path>/a</path><line>1</line></issue></issues></report>"#;
        assert!(matches!(
            RawXml.parse(input, None, &defaults(&RawXml)),
            Err(ReportError::Format { .. })
        ));
    }
}
