//! Human readable summary: a totals table per report followed by one issue
//! table per file. Generate only.

use super::rich::RichOptions;
use super::{Codec, DisplayOptions, OutputKind};
use crate::error::Result;
use crate::models::{Report, Severity};
use crate::options::{compose, OptionSpec, ResolvedOptions};

enum Cell {
    Text(String),
    Severity(Severity),
}

impl Cell {
    fn plain(&self, rich: &RichOptions) -> String {
        match self {
            Cell::Text(t) => t.clone(),
            Cell::Severity(s) => severity_text(rich, *s, s.label().to_string()),
        }
    }
}

fn severity_text(rich: &RichOptions, severity: Severity, label: String) -> String {
    let icon = rich.severity_icon(severity);
    if icon.is_empty() {
        label
    } else {
        format!("{icon} {label}")
    }
}

/// Lay out `rows` under `headers`. Text cells wrap at `rich.max_width`;
/// padding is computed on the uncolored text.
fn render_table(headers: &[&str], rows: &[Vec<Cell>], rich: &RichOptions) -> String {
    let cells: Vec<Vec<Vec<String>>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Cell::Text(t) => rich.wrap(t),
                    Cell::Severity(_) => vec![cell.plain(rich)],
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, lines) in row.iter().enumerate() {
            for line in lines {
                widths[i] = widths[i].max(line.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{}{}", rich.bold(h), " ".repeat(w - h.chars().count())))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rich.dim(&rule.join("  ")));
    out.push('\n');

    for (row, wrapped) in rows.iter().zip(&cells) {
        let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        for line_idx in 0..height {
            let mut parts = Vec::with_capacity(widths.len());
            for (col, lines) in wrapped.iter().enumerate() {
                let plain = lines.get(line_idx).map(String::as_str).unwrap_or("");
                let styled = match (&row[col], line_idx) {
                    (Cell::Severity(s), 0) => {
                        severity_text(rich, *s, rich.severity_label(*s))
                    }
                    _ => plain.to_string(),
                };
                let pad = widths[col].saturating_sub(plain.chars().count());
                parts.push(format!("{styled}{}", " ".repeat(pad)));
            }
            out.push_str(parts.join("  ").trim_end());
            out.push('\n');
        }
    }
    out
}

fn heading(rich: &RichOptions, title: &str, underline: char) -> String {
    let rule: String = std::iter::repeat(underline).take(title.chars().count()).collect();
    format!("{}\n{}\n", rich.bold(title), rich.dim(&rule))
}

fn summary_row(report: &Report) -> Vec<Cell> {
    let totals = report.totals();
    let time = report
        .total_time()
        .map(|t| format!("{t} ms"))
        .unwrap_or_else(|| "-".to_string());
    vec![
        Cell::Text(report.name().to_string()),
        Cell::Text(totals.files.to_string()),
        Cell::Text(totals.errors.to_string()),
        Cell::Text(totals.warnings.to_string()),
        Cell::Text(totals.tips.to_string()),
        Cell::Text(time),
    ]
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Info;

impl Codec for Info {
    fn name(&self) -> &'static str {
        "info"
    }

    fn description(&self) -> &'static str {
        "Pretty formatted summary and per-file details"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Text
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        compose([DisplayOptions::specs(), RichOptions::specs()])
    }

    fn generate(&self, report: &Report, options: &ResolvedOptions) -> Result<String> {
        let display = DisplayOptions::from_resolved(options)?;
        let rich = RichOptions::from_resolved(options)?;
        let mut out = heading(&rich, report.name(), '=');
        out.push('\n');

        let mut rows: Vec<Vec<Cell>> = report.sub_reports().iter().map(summary_row).collect();
        rows.push(summary_row(report));
        out.push_str(&render_table(
            &["Report", "Files", "Errors", "Warnings", "Tips", "Time"],
            &rows,
            &rich,
        ));
        out.push('\n');

        if !report.has_issues() {
            let icon = if rich.emoji { "✅ " } else { "" };
            out.push_str(&format!("{icon}No issues found. Everything looks good!\n"));
            return Ok(out);
        }

        out.push_str(&heading(&rich, "Detailed Issues", '-'));
        let mut headers = vec!["Line", "Severity"];
        if display.show_code {
            headers.push("Code");
        }
        headers.push("Message");
        if display.show_help {
            headers.push("Help");
        }
        if display.show_ref {
            headers.push("Ref");
        }

        for group in report.issues_by_file(true) {
            let shown = match group.issues[0].relative_path.as_str() {
                "." | "" => report.name(),
                rel => rel,
            };
            out.push('\n');
            out.push_str(&format!("File: {}\n", rich.bold(shown)));

            let rows: Vec<Vec<Cell>> = group
                .issues
                .iter()
                .map(|issue| {
                    let position = if issue.column > 0 {
                        format!("{}:{}", issue.line, issue.column)
                    } else {
                        issue.line.to_string()
                    };
                    let mut row = vec![Cell::Text(position), Cell::Severity(issue.severity)];
                    if display.show_code {
                        row.push(Cell::Text(issue.code.clone()));
                    }
                    row.push(Cell::Text(issue.message.clone()));
                    if display.show_help {
                        row.push(Cell::Text(issue.help.clone().unwrap_or_default()));
                    }
                    if display.show_ref {
                        row.push(Cell::Text(issue.reference.clone().unwrap_or_default()));
                    }
                    row
                })
                .collect();
            out.push_str(&render_table(&headers, &rows, &rich));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::resolve;
    use crate::options::OptionValue;
    use crate::test_support::sample_report;

    fn plain(extra: &[(&str, OptionValue)]) -> ResolvedOptions {
        let mut pairs = vec![("color", false.into()), ("emoji", false.into())];
        pairs.extend(extra.iter().cloned());
        resolve(&Info, &pairs)
    }

    #[test]
    fn test_summary_and_details() {
        let out = Info.generate(&sample_report(), &plain(&[])).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Test Report");
        assert_eq!(lines[1], "===========");
        assert!(lines[3].starts_with("Report"));
        assert!(out.contains("Test Report  4      2       3         1     10000 ms"));
        assert!(out.contains("File: src/File1.php"));
        assert!(out.contains("File: xyz/File.php"));
        assert!(out.contains("10:5   ERROR"));
        assert!(out.contains("Help message for a critical error"));
        assert!(!out.contains("https://example.com/"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_empty_report() {
        let mut report = Report::new("Empty", "/w");
        report.start();
        let out = Info.generate(&report, &plain(&[])).unwrap();
        assert!(out.contains("No issues found. Everything looks good!"));
        assert!(!out.contains("Detailed Issues"));
    }

    #[test]
    fn test_wrapping_and_toggles() {
        let opts = plain(&[
            ("max-width", 12i64.into()),
            ("show-code", false.into()),
            ("show-ref", true.into()),
        ]);
        let out = Info.generate(&sample_report(), &opts).unwrap();
        assert!(!out.contains("error.rule"));
        assert!(out.contains("Ref"));
        assert!(out.lines().any(|l| l.contains("critical") && !l.contains("This is a critical")));
    }

    #[test]
    fn test_colors_and_emoji() {
        let out = Info.generate(&sample_report(), &resolve(&Info, &[])).unwrap();
        assert!(out.contains('\u{1b}'));
        assert!(out.contains("❌"));
    }
}
