//! propcheck CLI - validate the declared properties of a build unit

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("propcheck=debug")
    } else {
        EnvFilter::new("propcheck=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color;
    match cli.command {
        Commands::Check(args) => commands::check::execute(args, color),
        Commands::Explain(args) => commands::explain::execute(args),
    }
}
