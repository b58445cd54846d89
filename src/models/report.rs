//! Hierarchical report aggregate.
//!
//! A `Report` owns its issues and its direct sub-reports. Totals are never
//! stored; every query walks the tree again so results always reflect the
//! current state.

use super::dump::ReportDump;
use super::issue::{Issue, IssueLocation, NO_PATH};
use super::Severity;
use crate::error::{ReportError, Result};
use crate::path;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Base path used when none is given or none can be derived.
pub const DEFAULT_BASE_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    name: String,
    base_path: String,
    issues: Vec<Issue>,
    sub_reports: Vec<Report>,
    time_start: Option<f64>,
    time_end: Option<f64>,
    total_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Recursive issue counts. `files` counts distinct paths.
pub struct Totals {
    pub errors: usize,
    pub warnings: usize,
    pub tips: usize,
    pub files: usize,
}

/// Issues sharing one exact path string, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct FileIssues<'a> {
    pub path: &'a str,
    pub issues: Vec<&'a Issue>,
}

/// Result of [`Report::get_issues`].
#[derive(Debug, Clone, PartialEq)]
pub enum IssueView<'a> {
    Flat(Vec<&'a Issue>),
    ByFile(Vec<FileIssues<'a>>),
}

fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Group by exact path, preserving first-appearance order.
fn group_by_path<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Vec<FileIssues<'a>> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<FileIssues<'a>> = Vec::new();
    for issue in issues {
        match index.get(issue.path.as_str()) {
            Some(&i) => groups[i].issues.push(issue),
            None => {
                index.insert(issue.path.as_str(), groups.len());
                groups.push(FileIssues {
                    path: issue.path.as_str(),
                    issues: vec![issue],
                });
            }
        }
    }
    groups
}

impl Report {
    /// Create an empty, unstarted report. The base path is normalized and
    /// terminated by exactly one `/`.
    pub fn new(name: impl Into<String>, base_path: &str) -> Self {
        let base = if base_path.is_empty() {
            DEFAULT_BASE_PATH.to_string()
        } else {
            format!("{}/", path::normalize(base_path).trim_end_matches('/'))
        };
        Report {
            name: name.into(),
            base_path: base,
            issues: Vec::new(),
            sub_reports: Vec::new(),
            time_start: None,
            time_end: None,
            total_time: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the report. A parent keys this report by name, so rename it
    /// before `merge_in`.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// This report's own issues, without descendants.
    pub fn own_issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn sub_reports(&self) -> &[Report] {
        &self.sub_reports
    }

    pub fn sub_report(&self, name: &str) -> Option<&Report> {
        self.sub_reports.iter().find(|r| r.name == name)
    }

    pub fn time_start(&self) -> Option<f64> {
        self.time_start
    }

    pub fn time_end(&self) -> Option<f64> {
        self.time_end
    }

    pub fn is_started(&self) -> bool {
        self.time_start.is_some()
    }

    pub fn start(&mut self) {
        self.time_start = Some(now_seconds());
    }

    pub fn complete(&mut self) {
        self.time_end = Some(now_seconds());
    }

    /// Set explicit start/end timestamps (epoch seconds).
    pub fn set_times(&mut self, start: f64, end: f64) {
        self.time_start = Some(start);
        self.time_end = Some(end);
    }

    /// Override the computed total time (milliseconds).
    pub fn set_total_time(&mut self, millis: f64) {
        self.total_time = Some(millis);
    }

    /// Elapsed milliseconds. The override wins; `None` until both
    /// timestamps exist.
    pub fn total_time(&self) -> Option<f64> {
        if let Some(t) = self.total_time {
            return Some(t);
        }
        let (start, end) = (self.time_start?, self.time_end?);
        Some(((end - start) * 1000.0).round())
    }

    /// Attach an issue, rewriting its path under the base path.
    pub fn add_issue(&mut self, mut issue: Issue) -> Result<()> {
        if !self.is_started() {
            return Err(ReportError::Precondition(format!(
                "report '{}' must be started before adding issues",
                self.name
            )));
        }
        if issue.code.trim().is_empty() {
            return Err(ReportError::Precondition(
                "issue code must not be empty".to_string(),
            ));
        }
        let normalized = path::normalize(issue.path.trim());
        issue.path = if normalized == NO_PATH {
            self.base_path.clone()
        } else if path::is_absolute(&normalized) {
            normalized
        } else {
            path::join(&self.base_path, &normalized)
        };
        self.push_stored(issue);
        Ok(())
    }

    pub fn add_issues(&mut self, issues: impl IntoIterator<Item = Issue>) -> Result<()> {
        for issue in issues {
            self.add_issue(issue)?;
        }
        Ok(())
    }

    /// Attach an issue whose path is already in stored form.
    fn push_stored(&mut self, mut issue: Issue) {
        issue.relative_path = path::strip_basepath(issue.path.trim(), &self.base_path);
        issue.trim_fields();
        self.issues.push(issue);
    }

    pub fn issue(
        &mut self,
        code: &str,
        severity: Severity,
        message: &str,
        at: IssueLocation,
    ) -> Result<()> {
        let mut issue = Issue::new(code, severity, message, at.path.as_deref().unwrap_or(NO_PATH))
            .with_line(at.line)
            .with_column(at.column);
        issue.help = at.help;
        issue.reference = at.reference;
        self.add_issue(issue)
    }

    pub fn error(&mut self, code: &str, message: &str, at: IssueLocation) -> Result<()> {
        self.issue(code, Severity::Error, message, at)
    }

    pub fn warning(&mut self, code: &str, message: &str, at: IssueLocation) -> Result<()> {
        self.issue(code, Severity::Warning, message, at)
    }

    pub fn tip(&mut self, code: &str, message: &str, at: IssueLocation) -> Result<()> {
        self.issue(code, Severity::Tip, message, at)
    }

    /// True when this report or any descendant holds an issue.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty() || self.sub_reports.iter().any(Report::has_issues)
    }

    /// Own issues followed by each descendant's, depth first.
    pub fn issues(&self, recursive: bool) -> Vec<&Issue> {
        let mut out: Vec<&Issue> = self.issues.iter().collect();
        if recursive {
            for sub in &self.sub_reports {
                out.extend(sub.issues(true));
            }
        }
        out
    }

    pub fn issues_by_file(&self, recursive: bool) -> Vec<FileIssues<'_>> {
        group_by_path(self.issues(recursive))
    }

    pub fn get_issues(&self, by_file: bool, recursive: bool) -> IssueView<'_> {
        if by_file {
            IssueView::ByFile(self.issues_by_file(recursive))
        } else {
            IssueView::Flat(self.issues(recursive))
        }
    }

    /// Direct sub-reports holding at least one issue (recursively).
    pub fn reports_with_issues(&self) -> Vec<&Report> {
        self.sub_reports.iter().filter(|r| r.has_issues()).collect()
    }

    pub fn reports_without_issues(&self) -> Vec<&Report> {
        self.sub_reports.iter().filter(|r| !r.has_issues()).collect()
    }

    /// Attach each report as a child keyed by its name. A child with the
    /// same name is replaced in place.
    pub fn merge_in(&mut self, reports: impl IntoIterator<Item = Report>) {
        for report in reports {
            match self.sub_reports.iter_mut().find(|r| r.name == report.name) {
                Some(slot) => {
                    debug!(parent = %self.name, child = %report.name, "replacing sub-report");
                    *slot = report;
                }
                None => self.sub_reports.push(report),
            }
        }
    }

    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        let mut paths: HashSet<&str> = HashSet::new();
        self.accumulate(&mut totals, &mut paths);
        totals.files = paths.len();
        totals
    }

    fn accumulate<'a>(&'a self, totals: &mut Totals, paths: &mut HashSet<&'a str>) {
        for issue in &self.issues {
            match issue.severity {
                Severity::Error => totals.errors += 1,
                Severity::Warning => totals.warnings += 1,
                Severity::Tip => totals.tips += 1,
            }
            paths.insert(issue.path.as_str());
        }
        for sub in &self.sub_reports {
            sub.accumulate(totals, paths);
        }
    }

    pub fn total_errors(&self) -> usize {
        self.totals().errors
    }

    pub fn total_warnings(&self) -> usize {
        self.totals().warnings
    }

    pub fn total_tips(&self) -> usize {
        self.totals().tips
    }

    pub fn total_files(&self) -> usize {
        self.totals().files
    }

    /// Rebuild a report tree from its structural dump.
    ///
    /// Issue paths are taken as stored; they are trimmed and get their
    /// relative path recomputed against the dump's base path.
    pub fn from_dump(dump: ReportDump) -> Result<Report> {
        let issues = dump
            .issues
            .ok_or_else(|| ReportError::missing_field("issues"))?;
        let name = dump
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ReportError::missing_field("name"))?;
        let base_path = dump
            .base_path
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ReportError::missing_field("basePath"))?;

        let mut report = Report::new(name, &base_path);
        for record in issues.into_records() {
            report.push_stored(record.into_issue()?);
        }
        for sub in dump.sub_reports {
            let child = Report::from_dump(sub)?;
            report.merge_in([child]);
        }
        if let (Some(start), Some(end)) = (dump.time_start, dump.time_end) {
            report.set_times(start, end);
        }
        report.total_time = dump.total_time;
        Ok(report)
    }

    /// Parse the JSON form of a structural dump.
    pub fn from_json(input: &str) -> Result<Report> {
        let dump: ReportDump =
            serde_json::from_str(input).map_err(|e| ReportError::format("json", e.to_string()))?;
        Report::from_dump(dump)
    }

    /// Assemble a report from issues decoded by a codec. The base path is
    /// the common base of the issue paths.
    pub fn from_parsed(name: impl Into<String>, issues: Vec<Issue>) -> Report {
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        let base = path::find_common_base_path(&paths);
        let mut report = Report::new(name, &base);
        for issue in issues {
            report.push_stored(issue);
        }
        report
    }
}

struct GroupedIssues<'a>(&'a [Issue]);

impl Serialize for GroupedIssues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let groups = group_by_path(self.0);
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for group in &groups {
            map.serialize_entry(group.path, &group.issues)?;
        }
        map.end()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let totals = self.totals();
        let mut st = serializer.serialize_struct("Report", 11)?;
        st.serialize_field("name", &self.name)?;
        st.serialize_field("basePath", &self.base_path)?;
        st.serialize_field("issues", &GroupedIssues(&self.issues))?;
        st.serialize_field("subReports", &self.sub_reports)?;
        st.serialize_field("timeStart", &self.time_start)?;
        st.serialize_field("timeEnd", &self.time_end)?;
        st.serialize_field("totalTime", &self.total_time())?;
        st.serialize_field("totalErrors", &totals.errors)?;
        st.serialize_field("totalWarnings", &totals.warnings)?;
        st.serialize_field("totalTips", &totals.tips)?;
        st.serialize_field("totalFiles", &totals.files)?;
        st.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_report;

    #[test]
    fn test_add_issue_requires_start() {
        let mut report = Report::new("r", "/project/base");
        let err = report
            .add_issue(Issue::new("c", Severity::Error, "m", "a.php"))
            .unwrap_err();
        assert!(matches!(err, ReportError::Precondition(_)));
        report.start();
        assert!(report
            .add_issue(Issue::new("c", Severity::Error, "m", "a.php"))
            .is_ok());
    }

    #[test]
    fn test_add_issue_rejects_empty_code() {
        let mut report = Report::new("r", "/");
        report.start();
        let err = report
            .add_issue(Issue::new("  ", Severity::Tip, "m", "a"))
            .unwrap_err();
        assert!(matches!(err, ReportError::Precondition(m) if m.contains("code")));
    }

    #[test]
    fn test_path_rewrite_on_attach() {
        let mut report = Report::new("r", "/project/base/");
        report.start();
        report
            .add_issue(Issue::new("c", Severity::Error, " msg ", "src/File1.php"))
            .unwrap();
        report
            .add_issue(Issue::new("c", Severity::Error, "m", "/elsewhere/x.php"))
            .unwrap();
        report
            .add_issue(Issue::new("c", Severity::Error, "m", NO_PATH))
            .unwrap();
        let issues = report.own_issues();
        assert_eq!(issues[0].path, "/project/base/src/File1.php");
        assert_eq!(issues[0].relative_path, "src/File1.php");
        assert_eq!(issues[0].message, "msg");
        assert_eq!(issues[1].path, "/elsewhere/x.php");
        assert_eq!(issues[1].relative_path, "elsewhere/x.php");
        assert_eq!(issues[2].path, "/project/base/");
        assert_eq!(issues[2].relative_path, ".");
    }

    #[test]
    fn test_base_path_is_normalized_with_trailing_separator() {
        assert_eq!(Report::new("r", "/a/b/../c").base_path(), "/a/c/");
        assert_eq!(Report::new("r", "/").base_path(), "/");
        assert_eq!(Report::new("r", "").base_path(), "/");
        assert_eq!(Report::new("r", "C:\\work\\").base_path(), "C:/work/");
    }

    #[test]
    fn test_totals_recursive_and_idempotent() {
        let mut parent = sample_report();
        let mut child = Report::new("child", "/project/base");
        child.start();
        child
            .error("child.rule", "boom", IssueLocation::at("src/File2.php", 1, 1))
            .unwrap();
        child
            .tip("child.tip", "hint", IssueLocation::at("lib/New.php", 2, 0))
            .unwrap();
        parent.merge_in([child]);

        let first = parent.totals();
        assert_eq!(first, parent.totals());
        assert_eq!(first.errors, 3);
        assert_eq!(first.warnings, 3);
        assert_eq!(first.tips, 2);
        // File1, File2, File3, xyz/File.php, lib/New.php
        assert_eq!(first.files, 5);
    }

    #[test]
    fn test_get_issues_grouping_and_recursion() {
        let mut parent = sample_report();
        let mut child = Report::new("child", "/project/base");
        child.start();
        child
            .warning("c", "m", IssueLocation::at("src/File1.php", 99, 0))
            .unwrap();
        parent.merge_in([child]);

        let flat = parent.issues(false);
        assert_eq!(flat.len(), 6);
        let all = parent.issues(true);
        assert_eq!(all.len(), 7);
        assert_eq!(all[6].line, 99);

        match parent.get_issues(true, true) {
            IssueView::ByFile(groups) => {
                assert_eq!(groups[0].path, "/project/base/src/File1.php");
                let lines: Vec<u32> = groups[0].issues.iter().map(|i| i.line).collect();
                assert_eq!(lines, vec![10, 25, 0, 99]);
            }
            IssueView::Flat(_) => panic!("expected grouped view"),
        }
    }

    #[test]
    fn test_grouping_is_by_exact_path() {
        let mut report = Report::new("r", "/");
        report.start();
        report.push_stored(Issue::new("c", Severity::Tip, "m", "/a/dir"));
        report.push_stored(Issue::new("c", Severity::Tip, "m", "/a/dir/"));
        assert_eq!(report.issues_by_file(false).len(), 2);
    }

    #[test]
    fn test_merge_in_replaces_by_name() {
        let mut parent = Report::new("p", "/");
        let mut first = Report::new("child", "/one");
        first.start();
        first
            .error("c", "m", IssueLocation::at("a.rs", 1, 1))
            .unwrap();
        parent.merge_in([first, Report::new("other", "/")]);
        parent.merge_in([Report::new("child", "/two")]);
        assert_eq!(parent.sub_reports().len(), 2);
        assert_eq!(parent.sub_reports()[0].base_path(), "/two/");
        assert!(!parent.has_issues());
        assert_eq!(parent.reports_without_issues().len(), 2);
    }

    #[test]
    fn test_total_time() {
        let mut report = Report::new("r", "/");
        assert_eq!(report.total_time(), None);
        report.set_times(100.0, 101.25);
        assert_eq!(report.total_time(), Some(1250.0));
        report.set_total_time(7.0);
        assert_eq!(report.total_time(), Some(7.0));
    }

    #[test]
    fn test_dump_round_trip() {
        let mut report = sample_report();
        let mut child = Report::new("child", "/other");
        child.start();
        child
            .tip("t", "hint", IssueLocation::at("x.rs", 3, 4))
            .unwrap();
        child.complete();
        report.merge_in([child]);

        let json = serde_json::to_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalErrors"], 2);
        assert_eq!(value["totalFiles"], 5);
        assert!(value["issues"]["/project/base/src/File1.php"].is_array());

        let back = Report::from_json(&json).unwrap();
        assert_eq!(back.name(), "Test Report");
        assert_eq!(back.base_path(), "/project/base/");
        assert_eq!(back.totals(), report.totals());
        assert_eq!(back.sub_reports()[0].own_issues()[0].relative_path, "x.rs");
        assert_eq!(back.own_issues()[0].reference, report.own_issues()[0].reference);
    }

    #[test]
    fn test_from_json_missing_fields() {
        let err = Report::from_json(r#"{"name":"r","issues":[]}"#).unwrap_err();
        assert!(matches!(err, ReportError::Precondition(ref m) if m.contains("basePath")));
        let err = Report::from_json(r#"{"name":"r","basePath":"/"}"#).unwrap_err();
        assert!(matches!(err, ReportError::Precondition(ref m) if m.contains("issues")));
        let err = Report::from_json(r#"{"name":"","basePath":"/","issues":[]}"#).unwrap_err();
        assert!(matches!(err, ReportError::Precondition(ref m) if m.contains("name")));
        let err = Report::from_json("{not json").unwrap_err();
        assert!(matches!(err, ReportError::Format { .. }));
    }

    #[test]
    fn test_from_parsed_derives_base_path() {
        let report = Report::from_parsed(
            "parsed",
            vec![
                Issue::new("a", Severity::Error, "m", "/srv/app/src/a.rs"),
                Issue::new("b", Severity::Error, "m", "/srv/app/tests/b.rs"),
            ],
        );
        assert_eq!(report.base_path(), "/srv/app/");
        assert_eq!(report.own_issues()[1].relative_path, "tests/b.rs");
        assert_eq!(Report::from_parsed("empty", vec![]).base_path(), "/");
    }
}
