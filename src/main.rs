//! Modbridge CLI entry point.

use anyhow::Result;
use clap::Parser;

use modbridge::cli::{commands, handle_error, Cli, Commands};
use modbridge::domain::models::Config;
use modbridge::infrastructure::config::ConfigLoader;
use modbridge::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config: Config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match cli.command {
        Commands::Process(args) => commands::process::execute(args, &config, cli.json).await,
        Commands::Preview(args) => commands::preview::execute(args, &config, cli.json).await,
        Commands::Strategies => commands::strategies::execute(&config, cli.json),
    }
}
