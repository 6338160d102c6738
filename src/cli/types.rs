//! Command-line argument types.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::preview::PreviewArgs;
use super::commands::process::ProcessArgs;

#[derive(Parser, Debug)]
#[command(name = "modbridge")]
#[command(about = "Modbridge - compromise strategy engine for mod conversion", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .modbridge/config.yaml and .modbridge/local.yaml)
    #[arg(short, long, global = true, env = "MODBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply compromises to every feature in a batch file
    Process(ProcessArgs),

    /// Show which strategy would be chosen without applying it
    Preview(PreviewArgs),

    /// List registered strategies per feature type
    Strategies,
}
