//! Command-line interface.
//!
//! A thin operator surface over the credential store: every command loads
//! configuration, builds the store, runs one operation, and prints the
//! result as a table or JSON.

pub mod commands;
pub mod display;
pub mod output;

use clap::{Parser, Subcommand};

use commands::init::InitArgs;
use commands::keys::KeysArgs;
use commands::seed::SeedUserArgs;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "token-auth-keys")]
#[command(about = "List per-user REST API token credentials", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create .token-auth/ with a default config and database
    Init(InitArgs),

    /// Inspect issued credentials
    Keys(KeysArgs),

    /// Write a fixture user (and optionally a key pair) into the local store
    SeedUser(SeedUserArgs),
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
