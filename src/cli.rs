//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "issue-reporter",
    version,
    about = "Convert code-quality reports between formats",
    long_about = "issue-reporter reads findings produced by linters and static analysers and rewrites them in another interchange format (Checkstyle, JUnit, SARIF, SonarQube, GitLab, LSP, Emacs, PHPCS, raw JSON/XML or a human summary).\n\nConfiguration precedence: CLI > issue-reporter.toml > defaults.",
    after_help = "Examples:\n  issue-reporter convert --from checkstyle --to sarif build/checkstyle.xml\n  issue-reporter convert --from emacs --to info --set max-width=80 -\n  issue-reporter convert --from phpcs --to gitlab --out gl-code-quality.json 'reports/*.json'\n  issue-reporter formats --output json\n  issue-reporter options --format sarif --scope both",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for converting reports and listing codecs.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current issue-reporter version."
    )]
    Version,
    /// Convert one or more reports
    #[command(
        about = "Convert reports between formats",
        long_about = "Parse every input with the --from codec and write one document with the --to codec. Several inputs are parsed in parallel and merged under a single parent report. Inputs may be glob patterns; '-' reads stdin.",
        after_help = "Examples:\n  issue-reporter convert --from checkstyle --to sarif --set pretty=true report.xml\n  issue-reporter convert --from sarif --to junit --set junit-show-ref=true a.sarif b.sarif\n  issue-reporter convert --from raw --to info --fail-on-error dump.json"
    )]
    Convert {
        #[arg(long, help = "Project root used for config discovery (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Input format (default: `from` in issue-reporter.toml)")]
        from: Option<String>,
        #[arg(long, help = "Output format (default: `to` in issue-reporter.toml)")]
        to: Option<String>,
        #[arg(long, help = "Name of the parsed report when the input carries none")]
        name: Option<String>,
        #[arg(long = "set", value_name = "KEY=VALUE", help = "Codec option, bare (pretty=true) or prefixed (sarif-pretty=true); repeatable")]
        sets: Vec<String>,
        #[arg(long, help = "Write the generated document to this file instead of stdout")]
        out: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit with status 1 when the converted report contains errors")]
        fail_on_error: bool,
        #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Log debug details to stderr")]
        verbose: bool,
        #[arg(required = true, help = "Input files or glob patterns; '-' reads stdin")]
        inputs: Vec<String>,
    },
    /// List available formats
    #[command(
        about = "List available formats",
        long_about = "Show every registered codec with its output kind, whether it can parse, and the issue features it round-trips.",
        after_help = "Examples:\n  issue-reporter formats\n  issue-reporter formats --output json"
    )]
    Formats {
        #[arg(long, help = "Project root used for config discovery (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// List codec options
    #[command(
        about = "List codec options",
        long_about = "Show the options one codec declares, or the deduplicated union across all codecs when --format is omitted.",
        after_help = "Examples:\n  issue-reporter options --format info\n  issue-reporter options --scope prefixed --output json"
    )]
    Options {
        #[arg(long, help = "Project root used for config discovery (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Restrict the listing to one codec")]
        format: Option<String>,
        #[arg(long, value_parser = ["bare", "prefixed", "both"], default_value = "bare", help = "Option names to list: bare|prefixed|both")]
        scope: String,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
