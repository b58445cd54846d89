//! Fixtures shared by unit tests.

use crate::models::{Issue, Report, Severity};

/// "Test Report" rooted at `/project/base` with one issue per interesting
/// shape: every severity, a line-less issue, a unicode message, a relative
/// path and a path outside `src/`. Timing spans exactly ten seconds.
pub fn sample_report() -> Report {
    let mut report = Report::new("Test Report", "/project/base");
    report.start();
    report
        .add_issues([
            Issue::new(
                "error.rule",
                Severity::Error,
                "This is a critical error.",
                "/project/base/src/File1.php",
            )
            .with_line(10)
            .with_column(5)
            .with_ref("https://example.com/error-example")
            .with_help("Help message for a critical error"),
            Issue::new(
                "warning.rule",
                Severity::Warning,
                "This is a warning.",
                "/project/base/src/File1.php",
            )
            .with_line(25)
            .with_column(15)
            .with_ref("https://example.com/warning-example")
            .with_help("Help message for a warning"),
            Issue::new(
                "tip.rule",
                Severity::Tip,
                "This is just a helpful tip.",
                "/project/base/src/File2.php",
            )
            .with_line(50)
            .with_column(1)
            .with_ref("https://example.com/tip-example")
            .with_help("Help message for a useful tip"),
            Issue::new(
                "noline.rule",
                Severity::Warning,
                "This issue has no line number.",
                "/project/base/src/File3.php",
            )
            .with_ref("https://example.com/warning-example")
            .with_help("Help message for another warning"),
            Issue::new(
                "unicode.test",
                Severity::Error,
                "Unicode char: é",
                "src/File1.php",
            )
            .with_ref("https://example.com/")
            .with_help("Unicode help"),
            Issue::new(
                "outside.src",
                Severity::Warning,
                "This error is outside src ",
                "xyz/File.php",
            )
            .with_ref("https://example.com/zzz")
            .with_help("So the computed base path should be /project/base"),
        ])
        .expect("sample issues attach to a started report");
    report.complete();
    let end = 1_700_000_000.0;
    report.set_times(end - 10.0, end);
    report
}

/// Issues ordered by path, keeping insertion order within each path.
pub fn sorted_by_path(issues: &[Issue]) -> Vec<Issue> {
    let mut out = issues.to_vec();
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}
