//! Output rendering for the `formats` and `options` listings and the
//! convert summary.
//!
//! Supports `human` (default) and `json` outputs. Generated documents never
//! pass through here; they go to stdout or `--out` untouched.

use crate::codec::{Feature, FeatureSet, Registry};
use crate::models::Report;
use crate::options::OptionSpec;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn print_json(value: &JsonVal) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Prefix for fatal messages on stderr.
pub fn error_prefix() -> String {
    if use_colors("human") {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

/// Prefix for informational messages on stderr.
pub fn note_prefix() -> String {
    if use_colors("human") {
        "note:".blue().bold().to_string()
    } else {
        "note:".to_string()
    }
}

fn feature_slugs(set: &FeatureSet) -> Vec<&'static str> {
    set.iter().map(|f| f.slug()).collect()
}

/// Print the registered codecs in the requested format.
pub fn print_formats(registry: &Registry, output: &str) {
    match output {
        "json" => print_json(&compose_formats_json(registry)),
        _ => {
            let color = use_colors(output);
            let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(0);
            for entry in registry.iter() {
                let codec = entry.codec();
                let name = format!("{:<width$}", codec.name());
                let name = if color {
                    name.bold().to_string()
                } else {
                    name
                };
                let mode = if entry.is_parsable() {
                    "parse+generate"
                } else {
                    "generate"
                };
                let mode = if color {
                    mode.dimmed().to_string()
                } else {
                    mode.to_string()
                };
                println!("{}  {:<4}  {}  {}", name, codec.kind().to_string(), mode, codec.description());
                if let Some(parsable) = entry.parsable() {
                    let native = feature_slugs(&parsable.supports());
                    if !native.is_empty() {
                        println!("{:width$}  supports: {}", "", native.join(", "));
                    }
                    let extra = feature_slugs(&parsable.supports_extra());
                    if !extra.is_empty() {
                        println!("{:width$}  via message: {}", "", extra.join(", "));
                    }
                }
            }
        }
    }
}

/// Compose the JSON listing for all registered codecs.
pub fn compose_formats_json(registry: &Registry) -> JsonVal {
    let items: Vec<JsonVal> = registry
        .iter()
        .map(|entry| {
            let codec = entry.codec();
            let (native, extra) = match entry.parsable() {
                Some(p) => (feature_slugs(&p.supports()), feature_slugs(&p.supports_extra())),
                None => (Vec::new(), Vec::new()),
            };
            json!({
                "name": codec.name(),
                "kind": codec.kind().to_string(),
                "description": codec.description(),
                "parsable": entry.is_parsable(),
                "supports": native,
                "supportsExtra": extra,
            })
        })
        .collect();
    let legend: serde_json::Map<String, JsonVal> = Feature::ALL
        .iter()
        .map(|f| (f.slug().to_string(), json!(f.describe())))
        .collect();
    json!({
        "formats": items,
        "features": legend,
        "summary": {
            "total": items.len(),
            "parsable": registry.iter().filter(|e| e.is_parsable()).count(),
        }
    })
}

/// Print option declarations in the requested format.
pub fn print_options(specs: &[OptionSpec], output: &str) {
    match output {
        "json" => print_json(&compose_options_json(specs)),
        _ => {
            let color = use_colors(output);
            let width = specs.iter().map(|s| s.name.len()).max().unwrap_or(0);
            for spec in specs {
                let name = format!("{:<width$}", spec.name);
                let name = if color {
                    name.cyan().bold().to_string()
                } else {
                    name
                };
                let default = match &spec.default {
                    Some(v) => format!("default: {v}"),
                    None => "required".to_string(),
                };
                let default = if color {
                    default.dimmed().to_string()
                } else {
                    default
                };
                println!("{}  {:<4}  {}  ({})", name, spec.mode.to_string(), spec.description, default);
            }
        }
    }
}

/// Compose the JSON listing for option declarations.
pub fn compose_options_json(specs: &[OptionSpec]) -> JsonVal {
    let items: Vec<JsonVal> = specs
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "mode": s.mode.to_string(),
                "description": s.description,
                "default": s.default,
            })
        })
        .collect();
    json!({ "options": items })
}

/// One-line summary of a converted report, for stderr.
pub fn compose_convert_summary(report: &Report, to: &str, dest: &str) -> String {
    let t = report.totals();
    format!(
        "wrote {} report to {}: {} error(s), {} warning(s), {} tip(s) in {} file(s)",
        to, dest, t.errors, t.warnings, t.tips, t.files
    )
}

/// Print the convert summary, colored by the worst severity present.
pub fn print_convert_summary(report: &Report, to: &str, dest: &str) {
    let line = compose_convert_summary(report, to, dest);
    if !use_colors("human") {
        eprintln!("{} {}", note_prefix(), line);
        return;
    }
    let t = report.totals();
    let line = if t.errors > 0 {
        line.red().to_string()
    } else if t.warnings > 0 {
        line.yellow().to_string()
    } else {
        line.green().to_string()
    };
    eprintln!("{} {}", note_prefix(), line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionScope;
    use crate::test_support::sample_report;

    #[test]
    fn test_compose_formats_json() {
        let v = compose_formats_json(&Registry::builtin());
        assert_eq!(v["summary"]["total"], 11);
        assert_eq!(v["summary"]["parsable"], 10);
        let formats = v["formats"].as_array().unwrap();
        assert_eq!(formats[0]["name"], "checkstyle");
        assert_eq!(formats[0]["kind"], "xml");
        let info = formats.iter().find(|f| f["name"] == "info").unwrap();
        assert_eq!(info["parsable"], false);
        assert_eq!(info["supports"], json!([]));
        let emacs = formats.iter().find(|f| f["name"] == "emacs").unwrap();
        assert!(emacs["supportsExtra"]
            .as_array()
            .unwrap()
            .contains(&json!("parsable-message")));
        assert_eq!(v["features"]["issue-ref"], "includes the reference link");
        assert_eq!(v["features"].as_object().unwrap().len(), 13);
    }

    #[test]
    fn test_compose_options_json() {
        let registry = Registry::builtin();
        let specs = registry
            .get("info")
            .unwrap()
            .codec()
            .options_definition(OptionScope::Prefixed);
        let v = compose_options_json(&specs);
        let items = v["options"].as_array().unwrap();
        let width = items.iter().find(|o| o["name"] == "info-max-width").unwrap();
        assert_eq!(width["mode"], "int");
        assert_eq!(width["default"], 0);
        let color = items.iter().find(|o| o["name"] == "info-color").unwrap();
        assert_eq!(color["mode"], "bool");
        assert_eq!(color["default"], true);
    }

    #[test]
    fn test_compose_convert_summary() {
        let line = compose_convert_summary(&sample_report(), "sarif", "out.sarif");
        assert_eq!(
            line,
            "wrote sarif report to out.sarif: 2 error(s), 3 warning(s), 1 tip(s) in 4 file(s)"
        );
    }

    #[test]
    fn test_use_colors_off_for_json() {
        assert!(!use_colors("json"));
    }
}
