//! Issue reporter core library.
//!
//! This crate models the findings of code-quality tools as a tree of reports
//! and converts them between interchange formats (Checkstyle, JUnit, SARIF,
//! SonarQube, GitLab, LSP, Emacs, PHPCS and two structural dumps).
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `codec`: The codec contract, shared option groups and every format.
//! - `config`: Discovery and effective configuration resolution.
//! - `error`: Error taxonomy returned by every fallible operation.
//! - `models`: Severity, issue and report tree.
//! - `options`: Declared codec options and their resolution.
//! - `output`: Human/JSON printers for the informational commands.
//! - `path`: String-level path normalization helpers.
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod options;
pub mod output;
pub mod path;

#[cfg(test)]
mod test_support;
