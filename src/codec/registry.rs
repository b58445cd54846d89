//! Name → codec lookup.
//!
//! The builtin catalogue is an explicit list; callers may register more.
//! Each entry records up front whether it can parse, so asking a
//! generate-only codec to parse is a configuration error rather than a
//! runtime downcast.

use super::checkstyle::Checkstyle;
use super::emacs::Emacs;
use super::gitlab::GitLab;
use super::info::Info;
use super::junit::Junit;
use super::lsp::Lsp;
use super::phpcs::Phpcs;
use super::raw::Raw;
use super::raw_xml::RawXml;
use super::sarif::Sarif;
use super::sonarqube::SonarQube;
use super::{Codec, FeatureSet, ParsableCodec};
use crate::error::{ReportError, Result};
use crate::models::Report;
use crate::options::{OptionResolver, OptionScope, OptionSpec, ResolvedOptions, SuppliedOptions};
use tracing::debug;

pub enum RegisteredCodec {
    GenerateOnly(Box<dyn Codec>),
    Parsable(Box<dyn ParsableCodec>),
}

impl RegisteredCodec {
    pub fn codec(&self) -> &dyn Codec {
        match self {
            RegisteredCodec::GenerateOnly(c) => c.as_ref(),
            RegisteredCodec::Parsable(c) => c.as_codec(),
        }
    }

    pub fn parsable(&self) -> Option<&dyn ParsableCodec> {
        match self {
            RegisteredCodec::GenerateOnly(_) => None,
            RegisteredCodec::Parsable(c) => Some(c.as_ref()),
        }
    }

    pub fn is_parsable(&self) -> bool {
        self.parsable().is_some()
    }

    pub fn name(&self) -> &'static str {
        self.codec().name()
    }
}

impl std::fmt::Debug for RegisteredCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredCodec")
            .field("name", &self.name())
            .field("parsable", &self.is_parsable())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<RegisteredCodec>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Every codec shipped with the crate.
    pub fn builtin() -> Self {
        let mut r = Registry::new();
        r.register(RegisteredCodec::Parsable(Box::new(Checkstyle)));
        r.register(RegisteredCodec::Parsable(Box::new(Junit)));
        r.register(RegisteredCodec::Parsable(Box::new(Sarif)));
        r.register(RegisteredCodec::Parsable(Box::new(SonarQube)));
        r.register(RegisteredCodec::Parsable(Box::new(GitLab)));
        r.register(RegisteredCodec::Parsable(Box::new(Lsp)));
        r.register(RegisteredCodec::Parsable(Box::new(Emacs)));
        r.register(RegisteredCodec::Parsable(Box::new(Phpcs)));
        r.register(RegisteredCodec::Parsable(Box::new(Raw)));
        r.register(RegisteredCodec::Parsable(Box::new(RawXml)));
        r.register(RegisteredCodec::GenerateOnly(Box::new(Info)));
        r
    }

    /// Add `entry`, replacing any codec registered under the same name.
    pub fn register(&mut self, entry: RegisteredCodec) {
        let name = entry.name();
        if let Some(slot) = self.entries.iter_mut().find(|e| e.name() == name) {
            debug!(codec = name, "replacing registered codec");
            *slot = entry;
        } else {
            self.entries.push(entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredCodec> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(RegisteredCodec::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredCodec> {
        self.entries.iter()
    }

    /// Union of every codec's options in `scope`, first declaration wins.
    pub fn options_definition(&self, scope: OptionScope) -> Vec<OptionSpec> {
        let mut out: Vec<OptionSpec> = Vec::new();
        for entry in &self.entries {
            for spec in entry.codec().options_definition(scope) {
                if !out.iter().any(|s| s.name == spec.name) {
                    out.push(spec);
                }
            }
        }
        out
    }

    /// Look up `name` and resolve `supplied` against its declared options.
    pub fn configure(&self, name: &str, supplied: &SuppliedOptions) -> Result<ConfiguredCodec<'_>> {
        let entry = self.get(name).ok_or_else(|| {
            ReportError::configuration(
                "format",
                format!("unknown format '{name}', expected one of: {}", self.names().join(", ")),
            )
        })?;
        let codec = entry.codec();
        let mut resolver = OptionResolver::new(codec.name(), codec.option_specs());
        resolver.resolve(supplied)?;
        debug!(codec = name, "configured codec");
        Ok(ConfiguredCodec {
            entry,
            options: resolver.into_resolved(),
        })
    }
}

/// A codec paired with its resolved options.
#[derive(Debug)]
pub struct ConfiguredCodec<'a> {
    entry: &'a RegisteredCodec,
    options: ResolvedOptions,
}

impl ConfiguredCodec<'_> {
    pub fn name(&self) -> &'static str {
        self.entry.name()
    }

    pub fn codec(&self) -> &dyn Codec {
        self.entry.codec()
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn generate(&self, report: &Report) -> Result<String> {
        debug!(codec = self.name(), report = report.name(), "generating");
        self.entry.codec().generate(report, &self.options)
    }

    pub fn parse(&self, input: &str, name: Option<&str>) -> Result<Report> {
        let codec = self.entry.parsable().ok_or_else(|| {
            ReportError::configuration(
                "format",
                format!("format '{}' can only generate reports", self.name()),
            )
        })?;
        debug!(codec = self.name(), bytes = input.len(), "parsing");
        codec.parse(input, name, &self.options)
    }

    pub fn is_parsable(&self) -> bool {
        self.entry.is_parsable()
    }

    /// Natively round-tripped features; empty for generate-only codecs.
    pub fn supports(&self) -> FeatureSet {
        self.entry.parsable().map(|c| c.supports()).unwrap_or_default()
    }

    pub fn supports_extra(&self) -> FeatureSet {
        self.entry
            .parsable()
            .map(|c| c.supports_extra())
            .unwrap_or_default()
    }
}
