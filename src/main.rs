//! issue-reporter CLI binary entry point.
//! Delegates to the library for parsing, merging and generating reports.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use issue_reporter::cli::{Cli, Commands};
use issue_reporter::codec::Registry;
use issue_reporter::models::Report;
use issue_reporter::options::OptionScope;
use issue_reporter::{config, output, path};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

const STDIN: &str = "-";

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Expand glob patterns. Literal paths and `-` pass through unchanged; a
/// pattern matching nothing is an error.
fn expand_inputs(inputs: &[String]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for input in inputs {
        if input == STDIN || !input.contains(['*', '?', '[']) {
            out.push(input.clone());
            continue;
        }
        let mut matched: Vec<PathBuf> = glob::glob(input)
            .with_context(|| format!("invalid glob pattern '{input}'"))?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        if matched.is_empty() {
            bail!("no input matched '{input}'");
        }
        matched.sort();
        out.extend(matched.into_iter().map(|p| p.to_string_lossy().into_owned()));
    }
    if out.iter().filter(|i| *i == STDIN).count() > 1 {
        bail!("stdin ('-') can only be given once");
    }
    Ok(out)
}

fn read_input(input: &str) -> Result<String> {
    if input == STDIN {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
}

/// Attach independently parsed reports under one parent rooted at their
/// common base. Children keep their document name unless an earlier input
/// already took it; then the input path is appended so no input replaces
/// another in the parent.
fn merge_children(name: &str, parsed: Vec<(&str, Report)>) -> Report {
    let mut used: HashSet<String> = HashSet::new();
    let mut children = Vec::with_capacity(parsed.len());
    for (input, mut child) in parsed {
        let mut candidate = child.name().to_string();
        if used.contains(&candidate) {
            candidate = format!("{} ({input})", child.name());
            let mut n = 2;
            while used.contains(&candidate) {
                candidate = format!("{} ({input}) #{n}", child.name());
                n += 1;
            }
            debug!(from = child.name(), to = %candidate, "renaming duplicate sub-report");
            child.set_name(candidate.clone());
        }
        used.insert(candidate);
        children.push(child);
    }
    let bases: Vec<&str> = children.iter().map(Report::base_path).collect();
    let base = path::find_common_base_path(&bases);
    let mut parent = Report::new(name, &base);
    parent.start();
    debug!(children = children.len(), base = %base, "merging parsed reports");
    parent.merge_in(children);
    parent.complete();
    parent
}

#[allow(clippy::too_many_arguments)]
fn convert(
    root: Option<String>,
    from: Option<String>,
    to: Option<String>,
    name: Option<String>,
    sets: Vec<String>,
    out: Option<String>,
    fail_on_error: bool,
    inputs: Vec<String>,
) -> Result<i32> {
    let eff = config::resolve_effective(root.as_deref(), from.as_deref(), to.as_deref(), None, &sets)?;
    if let Some(file) = &eff.config_file {
        debug!(path = %file.display(), "using config file");
    }
    let from = eff
        .from
        .ok_or_else(|| anyhow!("missing input format: pass --from or set `from` in issue-reporter.toml"))?;
    let to = eff
        .to
        .ok_or_else(|| anyhow!("missing output format: pass --to or set `to` in issue-reporter.toml"))?;

    let registry = Registry::builtin();
    let parser = registry.configure(&from, &eff.options)?;
    if !parser.is_parsable() {
        bail!("format '{from}' cannot be used with --from: it only generates reports");
    }
    let generator = registry.configure(&to, &eff.options)?;

    let inputs = expand_inputs(&inputs)?;
    let sources: Vec<(String, String)> = inputs
        .into_iter()
        .map(|input| read_input(&input).map(|content| (input, content)))
        .collect::<Result<_>>()?;

    let single = sources.len() == 1;
    let mut reports: Vec<(&str, Report)> = sources
        .par_iter()
        .map(|(input, content)| {
            let fallback = if single { name.as_deref() } else { Some(input.as_str()) };
            parser
                .parse(content, fallback)
                .map(|report| (input.as_str(), report))
                .with_context(|| format!("failed to parse {input} as {from}"))
        })
        .collect::<Result<_>>()?;

    let report = if single {
        reports.remove(0).1
    } else {
        let parent = name.unwrap_or_else(|| format!("Converted {from} reports"));
        merge_children(&parent, reports)
    };
    info!(
        errors = report.total_errors(),
        warnings = report.total_warnings(),
        tips = report.total_tips(),
        "parsed report"
    );

    let document = generator.generate(&report)?;
    match &out {
        Some(dest) => {
            fs::write(dest, &document).with_context(|| format!("failed to write {dest}"))?;
            output::print_convert_summary(&report, &to, dest);
        }
        None => {
            if document.ends_with('\n') {
                print!("{document}");
            } else {
                println!("{document}");
            }
        }
    }

    if fail_on_error && report.total_errors() > 0 {
        return Ok(1);
    }
    Ok(0)
}

fn run(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Convert {
            root,
            from,
            to,
            name,
            sets,
            out,
            fail_on_error,
            verbose,
            inputs,
        } => {
            setup_logging(verbose);
            convert(root, from, to, name, sets, out, fail_on_error, inputs)
        }
        Commands::Formats { root, output: mode } => {
            setup_logging(false);
            let eff = config::resolve_effective(root.as_deref(), None, None, mode.as_deref(), &[])?;
            output::print_formats(&Registry::builtin(), &eff.output);
            Ok(0)
        }
        Commands::Options {
            root,
            format,
            scope,
            output: mode,
        } => {
            setup_logging(false);
            let eff = config::resolve_effective(root.as_deref(), None, None, mode.as_deref(), &[])?;
            let scope = match scope.as_str() {
                "prefixed" => OptionScope::Prefixed,
                "both" => OptionScope::Both,
                _ => OptionScope::Bare,
            };
            let registry = Registry::builtin();
            let specs = match format {
                Some(name) => {
                    let entry = registry.get(&name).ok_or_else(|| {
                        anyhow!(
                            "unknown format '{name}', expected one of: {}",
                            registry.names().join(", ")
                        )
                    })?;
                    entry.codec().options_definition(scope)
                }
                None => registry.options_definition(scope),
            };
            output::print_options(&specs, &eff.output);
            Ok(0)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", output::error_prefix(), e);
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issue_reporter::models::{Issue, Severity};
    use tempfile::tempdir;

    #[test]
    fn test_expand_inputs_globs_and_literals() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("b.xml"), "").unwrap();
        fs::write(root.join("a.xml"), "").unwrap();
        fs::write(root.join("c.json"), "").unwrap();
        let pattern = format!("{}/*.xml", root.display());
        let out = expand_inputs(&[pattern, "-".to_string(), "literal.txt".to_string()]).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out[0].ends_with("a.xml"));
        assert!(out[1].ends_with("b.xml"));
        assert_eq!(out[2], "-");
        assert_eq!(out[3], "literal.txt");
    }

    #[test]
    fn test_expand_inputs_rejects_empty_glob_and_double_stdin() {
        let dir = tempdir().unwrap();
        let pattern = format!("{}/*.none", dir.path().display());
        assert!(expand_inputs(&[pattern]).is_err());
        assert!(expand_inputs(&["-".to_string(), "-".to_string()]).is_err());
    }

    #[test]
    fn test_merge_children_uses_common_base() {
        let a = Report::from_parsed(
            "a",
            vec![Issue::new("x", Severity::Error, "m", "/w/app/src/a.php").with_line(1)],
        );
        let b = Report::from_parsed(
            "b",
            vec![Issue::new("y", Severity::Tip, "m", "/w/app/lib/b.php").with_line(2)],
        );
        let parent = merge_children("all", vec![("a.xml", a), ("b.xml", b)]);
        assert_eq!(parent.base_path(), "/w/app/");
        assert_eq!(parent.sub_reports().len(), 2);
        assert_eq!(parent.total_errors(), 1);
        assert_eq!(parent.total_tips(), 1);
        assert!(parent.own_issues().is_empty());
    }

    #[test]
    fn test_merge_children_keeps_inputs_with_same_document_name() {
        let registry = Registry::builtin();
        let raw = registry
            .configure("raw", &issue_reporter::options::SuppliedOptions::new())
            .unwrap();
        let dump = |path: &str| {
            format!(
                r#"{{"name":"CI","basePath":"/w","issues":[{{"code":"c","severity":5,"message":"m","path":"{path}","line":1}}]}}"#
            )
        };
        let first = raw.parse(&dump("/w/a.php"), Some("one.json")).unwrap();
        let second = raw.parse(&dump("/w/b.php"), Some("two.json")).unwrap();
        let third = raw.parse(&dump("/w/c.php"), Some("two.json")).unwrap();

        let parent = merge_children(
            "all",
            vec![("one.json", first), ("two.json", second), ("two.json", third)],
        );
        let names: Vec<&str> = parent.sub_reports().iter().map(Report::name).collect();
        assert_eq!(names, vec!["CI", "CI (two.json)", "CI (two.json) #2"]);
        assert_eq!(parent.total_errors(), 3);
        assert_eq!(parent.total_files(), 3);
    }
}
