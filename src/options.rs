//! Option declarations and their resolution into a codec configuration.
//!
//! Each reusable feature declares options as `(name, mode, description,
//! default)`. A codec's options may be listed bare (`pretty`), prefixed with
//! the codec name (`sarif-pretty`), or both. Resolution takes a flat map of
//! supplied values with arbitrary keys and produces one concrete value per
//! declared option:
//!
//! - the codec's own prefixed key (`<codec>-<name>`) wins over the bare key;
//! - a bare key is ignored for a codec when its prefixed key is supplied;
//! - with nothing supplied, a value resolved by an earlier call is kept;
//! - otherwise the declared default applies.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionMode {
    /// Boolean switch, `--name` / `--no-name` on a command line.
    Negatable,
    Integer,
    Text,
}

impl fmt::Display for OptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionMode::Negatable => "bool",
            OptionMode::Integer => "int",
            OptionMode::Text => "text",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSpec {
    pub name: String,
    pub mode: OptionMode,
    pub description: String,
    /// `None` marks a required option.
    pub default: Option<OptionValue>,
}

impl OptionSpec {
    pub fn flag(name: &str, description: &str, default: bool) -> Self {
        OptionSpec {
            name: name.to_string(),
            mode: OptionMode::Negatable,
            description: description.to_string(),
            default: Some(OptionValue::Bool(default)),
        }
    }

    pub fn integer(name: &str, description: &str, default: i64) -> Self {
        OptionSpec {
            name: name.to_string(),
            mode: OptionMode::Integer,
            description: description.to_string(),
            default: Some(OptionValue::Int(default)),
        }
    }

    pub fn text(name: &str, description: &str, default: Option<&str>) -> Self {
        OptionSpec {
            name: name.to_string(),
            mode: OptionMode::Text,
            description: description.to_string(),
            default: default.map(OptionValue::from),
        }
    }

    pub fn prefixed(&self, codec: &str) -> Self {
        OptionSpec {
            name: format!("{codec}-{}", self.name),
            ..self.clone()
        }
    }

    /// Convert a supplied value to this option's mode.
    fn coerce(&self, value: &OptionValue) -> Result<OptionValue> {
        let bad = |expected: &str| {
            ReportError::configuration(
                &self.name,
                format!("expected {expected}, got '{value}'"),
            )
        };
        match (self.mode, value) {
            (OptionMode::Negatable, OptionValue::Bool(b)) => Ok(OptionValue::Bool(*b)),
            (OptionMode::Negatable, OptionValue::Int(0)) => Ok(OptionValue::Bool(false)),
            (OptionMode::Negatable, OptionValue::Int(1)) => Ok(OptionValue::Bool(true)),
            (OptionMode::Negatable, OptionValue::Str(s)) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" | "on" => Ok(OptionValue::Bool(true)),
                    "false" | "0" | "no" | "off" => Ok(OptionValue::Bool(false)),
                    _ => Err(bad("a boolean")),
                }
            }
            (OptionMode::Negatable, _) => Err(bad("a boolean")),
            (OptionMode::Integer, OptionValue::Int(i)) => Ok(OptionValue::Int(*i)),
            (OptionMode::Integer, OptionValue::Str(s)) => s
                .trim()
                .parse::<i64>()
                .map(OptionValue::Int)
                .map_err(|_| bad("an integer")),
            (OptionMode::Integer, _) => Err(bad("an integer")),
            (OptionMode::Text, v) => Ok(OptionValue::Str(v.to_string())),
        }
    }
}

/// Which form of option names a definition list carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionScope {
    #[default]
    Bare,
    Prefixed,
    Both,
}

/// List `specs` for `codec` in the requested scope. `Both` yields each
/// bare option immediately followed by its prefixed twin.
pub fn expand(codec: &str, specs: &[OptionSpec], scope: OptionScope) -> Vec<OptionSpec> {
    let mut out = Vec::with_capacity(specs.len() * 2);
    for spec in specs {
        match scope {
            OptionScope::Bare => out.push(spec.clone()),
            OptionScope::Prefixed => out.push(spec.prefixed(codec)),
            OptionScope::Both => {
                out.push(spec.clone());
                out.push(spec.prefixed(codec));
            }
        }
    }
    out
}

/// Concatenate feature option groups. The first declaration of a name wins.
pub fn compose(groups: impl IntoIterator<Item = Vec<OptionSpec>>) -> Vec<OptionSpec> {
    let mut out: Vec<OptionSpec> = Vec::new();
    for spec in groups.into_iter().flatten() {
        if !out.iter().any(|s| s.name == spec.name) {
            out.push(spec);
        }
    }
    out
}

/// Flat map of user-supplied values, keyed bare or `<codec>-` prefixed.
pub type SuppliedOptions = BTreeMap<String, OptionValue>;

/// Concrete value for every declared option of one codec, keyed bare.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedOptions(BTreeMap<String, OptionValue>);

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }

    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.0.get(name) {
            Some(OptionValue::Bool(b)) => Ok(*b),
            Some(other) => Err(ReportError::configuration(
                name,
                format!("expected a boolean, got '{other}'"),
            )),
            None => Err(ReportError::configuration(name, "option was not resolved")),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.0.get(name) {
            Some(OptionValue::Int(i)) => Ok(*i),
            Some(other) => Err(ReportError::configuration(
                name,
                format!("expected an integer, got '{other}'"),
            )),
            None => Err(ReportError::configuration(name, "option was not resolved")),
        }
    }

    fn insert(&mut self, name: String, value: OptionValue) {
        self.0.insert(name, value);
    }
}

/// Stateful resolver for one codec. Re-resolving keeps earlier values for
/// options the new map does not mention.
#[derive(Debug, Clone)]
pub struct OptionResolver {
    codec: String,
    specs: Vec<OptionSpec>,
    resolved: ResolvedOptions,
}

impl OptionResolver {
    /// `specs` are the codec's options in bare form.
    pub fn new(codec: &str, specs: Vec<OptionSpec>) -> Self {
        OptionResolver {
            codec: codec.to_string(),
            specs,
            resolved: ResolvedOptions::default(),
        }
    }

    pub fn resolve(&mut self, supplied: &SuppliedOptions) -> Result<&ResolvedOptions> {
        let own_prefix = format!("{}-", self.codec);
        for spec in expand(&self.codec, &self.specs, OptionScope::Both) {
            let key = match spec.name.strip_prefix(&own_prefix) {
                Some(bare) => bare.to_string(),
                None => {
                    if supplied.contains_key(&format!("{own_prefix}{}", spec.name)) {
                        continue;
                    }
                    spec.name.clone()
                }
            };
            let explicit = supplied.get(&spec.name);
            if explicit.is_none() && self.resolved.contains(&key) {
                continue;
            }
            let value = match explicit {
                Some(v) => spec.coerce(v)?,
                None => spec.default.clone().ok_or_else(|| {
                    ReportError::configuration(&spec.name, "required option has no value")
                })?,
            };
            debug!(codec = %self.codec, option = %key, value = %value, "resolved option");
            self.resolved.insert(key, value);
        }
        Ok(&self.resolved)
    }

    pub fn resolved(&self) -> &ResolvedOptions {
        &self.resolved
    }

    pub fn into_resolved(self) -> ResolvedOptions {
        self.resolved
    }
}
