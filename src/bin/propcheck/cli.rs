//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// propcheck - lazy property validation for build units
#[derive(Parser)]
#[command(name = "propcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the properties declared in Unit.toml
    Check(CheckArgs),

    /// Describe a validation problem id
    Explain(ExplainArgs),
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable diagnostics on stderr
    Text,
    /// JSON report on stdout
    Json,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Path to Unit.toml (defaults to searching upward from the current directory)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Fail when warnings are reported
    #[arg(long)]
    pub deny_warnings: bool,

    /// Validate properties in parallel
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Problem id, e.g. VALUE_NOT_SET
    #[arg(required_unless_present = "list")]
    pub id: Option<String>,

    /// List all problem ids
    #[arg(long)]
    pub list: bool,
}
