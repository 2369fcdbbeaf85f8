use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use landsector::cli::{Cli, Commands};
use landsector::commands::run;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match &cli.command {
        Commands::Run(args) => run::run(args),
    }
}
