use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Boundary clipping and land-use sector partitioning
#[derive(Parser, Debug)]
#[command(name = "landsector", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clip features to a boundary set and write the sector partitions
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input feature collection (GeoJSON)
    #[arg(value_hint = ValueHint::FilePath)]
    pub features: PathBuf,

    /// Boundary set (GeoJSON feature collection or bare geometry)
    #[arg(value_hint = ValueHint::FilePath)]
    pub boundary: PathBuf,

    /// Output location (directory).
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out: PathBuf,

    /// Pipeline configuration (JSON)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// CRS of both inputs as a proj4 string; overrides the config
    #[arg(long)]
    pub source_crs: Option<String>,

    /// Worker threads; overrides the config
    #[arg(long)]
    pub threads: Option<usize>,

    /// Overwrite existing output files
    #[arg(long)]
    pub force: bool,
}
