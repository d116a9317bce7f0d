//! token-auth-keys CLI entry point.

use clap::Parser;

use token_auth_keys::cli::{commands, handle_error, Cli, Commands};
use token_auth_keys::infrastructure::config::ConfigLoader;
use token_auth_keys::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Held for the life of the process so buffered file logs are flushed.
    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Keys(args) => commands::keys::execute(args, &config, cli.json).await,
        Commands::SeedUser(args) => commands::seed::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
