//! Implementation of the `token-auth-keys init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{create_config_dir, create_config_file, run_migrations, SetupPaths};

/// Arguments of `init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

/// Result of `init`.
#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    /// False when the project was already initialized.
    pub success: bool,
    /// Summary line.
    pub message: String,
    /// Project root.
    pub initialized_path: PathBuf,
    /// Whether `config.yaml` was (re)written.
    pub config_written: bool,
    /// Location of the migrated database.
    pub database_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("  config:   {}", self.initialized_path.join(".token-auth/config.yaml").display()));
        }
        lines.push(format!("  database: {}", self.database_path.display()));
        lines.join("\n")
    }
}

/// Run `init`.
pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let paths = SetupPaths::under(&target_path);
    if paths.is_initialized() && !args.force {
        let out = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to rewrite the config.".to_string(),
            initialized_path: target_path,
            config_written: false,
            database_path: paths.database_file,
        };
        output(&out, json_mode);
        return Ok(());
    }

    create_config_dir(&paths)?;
    let config_written = create_config_file(&paths, args.force)?;
    run_migrations(&paths).await?;

    let out = InitOutput {
        success: true,
        message: format!("Initialized token auth key store in {}", target_path.display()),
        initialized_path: target_path,
        config_written,
        database_path: paths.database_file,
    };
    output(&out, json_mode);
    Ok(())
}
