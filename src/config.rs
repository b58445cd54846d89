//! Configuration discovery and effective settings resolution.
//!
//! The reporter reads `issue-reporter.toml|yaml|yml` from the project root
//! (or closest ancestor) and merges it with CLI flags to produce an
//! `Effective` config. Defaults:
//! - `from`, `to`: unset (the CLI requires them one way or the other)
//! - `output`: `human`
//! - `options`: empty
//!
//! Overrides precedence: CLI > config file > defaults. `--set key=value`
//! pairs are laid over the file's `[options]` table key by key.

use crate::error::{ReportError, Result};
use crate::options::{OptionValue, SuppliedOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILES: [&str; 3] = [
    "issue-reporter.toml",
    "issue-reporter.yaml",
    "issue-reporter.yml",
];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `issue-reporter.toml|yaml`.
pub struct ReporterConfig {
    pub from: Option<String>,
    pub to: Option<String>,
    pub output: Option<String>,
    /// Codec options, bare (`pretty`) or prefixed (`sarif-pretty`).
    #[serde(default)]
    pub options: Option<BTreeMap<String, OptionValue>>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub config_file: Option<PathBuf>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub output: String,
    pub options: SuppliedOptions,
}

/// Walk upward from `start` to detect the project root.
///
/// Stops when an `issue-reporter.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `ReporterConfig` from the first config file present under `root`.
///
/// A file that exists but cannot be read or parsed is an error; a missing
/// file is `Ok(None)`.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, ReporterConfig)>> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let bad = |msg: String| ReportError::configuration(name, msg);
        let s = fs::read_to_string(&path).map_err(|e| bad(e.to_string()))?;
        let cfg: ReporterConfig = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|e| bad(e.to_string()))?
        } else {
            serde_yaml::from_str(&s).map_err(|e| bad(e.to_string()))?
        };
        debug!(path = %path.display(), "loaded config");
        return Ok(Some((path, cfg)));
    }
    Ok(None)
}

/// Parse repeated `key=value` pairs. A bare `key` means `key=true`.
///
/// Values stay strings; the option resolver coerces them to each option's
/// declared mode.
pub fn parse_set_pairs(pairs: &[String]) -> Result<SuppliedOptions> {
    let mut out = SuppliedOptions::new();
    for pair in pairs {
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (k.trim(), OptionValue::Str(v.trim().to_string())),
            None => (pair.trim(), OptionValue::Bool(true)),
        };
        let key = key.trim_start_matches("--");
        if key.is_empty() {
            return Err(ReportError::configuration(
                "set",
                format!("expected key=value, got '{pair}'"),
            ));
        }
        out.insert(key.to_string(), value);
    }
    Ok(out)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_root: Option<&str>,
    cli_from: Option<&str>,
    cli_to: Option<&str>,
    cli_output: Option<&str>,
    cli_sets: &[String],
) -> Result<Effective> {
    let start = PathBuf::from(cli_root.unwrap_or("."));
    let root = detect_root(&start);
    let (config_file, cfg) = match load_config(&root)? {
        Some((path, cfg)) => (Some(path), cfg),
        None => (None, ReporterConfig::default()),
    };

    let from = cli_from.map(str::to_string).or(cfg.from);
    let to = cli_to.map(str::to_string).or(cfg.to);
    let output = cli_output
        .map(str::to_string)
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let mut options: SuppliedOptions = cfg.options.unwrap_or_default();
    options.extend(parse_set_pairs(cli_sets)?);

    Ok(Effective {
        root,
        config_file,
        from,
        to,
        output,
        options,
    })
}
