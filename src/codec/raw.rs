//! Lossless JSON dump of the whole report tree.

use super::json::{parse_json, render_json, JsonOptions};
use super::{report_name, Codec, DisplayOptions, Feature, FeatureSet, OutputKind, ParsableCodec};
use crate::error::Result;
use crate::models::{Report, ReportDump};
use crate::options::{compose, OptionSpec, ResolvedOptions};

#[derive(Debug, Default, Clone, Copy)]
pub struct Raw;

impl Codec for Raw {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn description(&self) -> &'static str {
        "Complete JSON representation of the report tree"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Json
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([DisplayOptions::specs(), JsonOptions::specs()])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        render_json(report, &JsonOptions::from_resolved(options)?)
    }
}

impl ParsableCodec for Raw {
    /// A dump without a top-level name takes the fallback name; every other
    /// required field must be present.
    fn parse(&self, input: &str, name: Option<&str>, _options: &ResolvedOptions) -> Result<Report> {
        let mut dump: ReportDump = parse_json(self, input)?;
        dump.name = Some(report_name(self, dump.name.as_deref(), name));
        Report::from_dump(dump)
    }

    /// Every issue field survives. Issues are grouped by path in the dump,
    /// so insertion order is kept within a file but not across files.
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
    use crate::error::ReportError;
    use crate::models::{Issue, Severity};
    use crate::test_support::{sample_report, sorted_by_path};

    #[test]
    fn test_round_trip_is_lossless() {
        let mut report = sample_report();
        let mut child = Report::new("child", "/project/base/lib");
        child.start();
        let mut issue = Issue::new("c.rule", Severity::Tip, "Child tip", "a.php").with_line(3);
        issue.add_extra("fixable", true);
        child.add_issue(issue).unwrap();
        report.merge_in([child]);

        let opts = resolve(&Raw, &[("pretty", true.into())]);
        let back = Raw.parse(&Raw.generate(&report, &opts).unwrap(), None, &opts).unwrap();
        assert_eq!(back.name(), "Test Report");
        assert_eq!(back.base_path(), "/project/base/");
        assert_eq!(back.totals(), report.totals());
        assert_eq!(back.total_time(), Some(10000.0));
        assert_eq!(sorted_by_path(back.own_issues()), sorted_by_path(report.own_issues()));
        let child = back.sub_report("child").unwrap();
        assert_eq!(child.own_issues()[0].path, "/project/base/lib/a.php");
        assert_eq!(child.own_issues()[0].extra["fixable"], true);
    }

    #[test]
    fn test_missing_name_uses_fallback() {
        let input = r#"{"basePath":"/w","issues":[]}"#;
        let report = Raw.parse(input, Some("given"), &defaults(&Raw)).unwrap();
        assert_eq!(report.name(), "given");
        let report = Raw.parse(input, None, &defaults(&Raw)).unwrap();
        assert_eq!(report.name(), "Parsed raw report");
    }

    #[test]
    fn test_missing_issue_field_is_precondition() {
        let input = r#"{"name":"n","basePath":"/w","issues":[{"code":"c","severity":5,"path":"/w/a","line":1}]}"#;
        let err = Raw.parse(input, None, &defaults(&Raw)).unwrap_err();
        assert!(matches!(err, ReportError::Precondition(ref m) if m.contains("message")));
    }
}
