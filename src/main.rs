//! wikifolio trading API command line client.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::commands::{self, orders, wikifolios};
use cli::{Cli, Commands, LimitCommands, QuoteCommands};
use logging::setup_logging;
use std::path::Path;
use wikifolio_config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config: config_path,
        log_level,
        json_logs,
        output,
        paper,
        command,
    } = Cli::parse();

    if let Commands::ValidateConfig = command {
        let level = log_level.map_or("info", |l| l.as_str());
        setup_logging(level, json_logs, None);
        return commands::validate::run(&config_path).await;
    }

    let config = load_config(&config_path).context("Failed to load configuration")?;

    // Setup logging
    let level = log_level.map_or(config.logging.level.as_str(), |l| l.as_str());
    let _log_guard = setup_logging(
        level,
        json_logs || config.logging.is_json(),
        config.logging.file.as_deref().map(Path::new),
    );

    let api = commands::backend(paper, &config)?;
    let api = api.as_ref();

    // Execute command
    match command {
        Commands::List => wikifolios::list(api, output).await,
        Commands::Show { symbol } => wikifolios::show(api, &symbol, output).await,
        Commands::Underlyings { symbol } => wikifolios::underlyings(api, &symbol, output).await,
        Commands::Orders { symbol, status } => orders::list(api, &symbol, status, output).await,
        Commands::Limit(LimitCommands::Place(args)) => orders::place_limit(api, args, output).await,
        Commands::Limit(LimitCommands::Show { order_id }) => {
            orders::show_limit(api, &order_id, output).await
        }
        Commands::Limit(LimitCommands::Delete { order_id }) => {
            orders::delete_limit(api, &order_id, output).await
        }
        Commands::Quote(QuoteCommands::Place(args)) => orders::place_quote(api, args, output).await,
        Commands::ValidateConfig => commands::validate::run(&config_path).await,
    }
}
