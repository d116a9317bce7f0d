//! Credential listing commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::display::{colorize_completeness, colorize_key, list_table, mask_secret, render_page};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{Config, CredentialListPage, UserCredential, UserId};
use crate::infrastructure::setup::build_credential_store;

/// Arguments of `keys`.
#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: KeysCommands,
}

/// `keys` subcommands.
#[derive(Subcommand, Debug)]
pub enum KeysCommands {
    /// List credentialed users one page at a time
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Rows per page (defaults to listing.per_page)
        #[arg(long)]
        per_page: Option<u32>,
        /// Print secret keys in full instead of masked
        #[arg(long)]
        reveal: bool,
    },
    /// Show one user's credential
    Show {
        /// User ID
        user_id: u64,
        /// Print the secret key in full instead of masked
        #[arg(long)]
        reveal: bool,
    },
    /// Count credentialed users
    Count,
    /// Print a user's derived token
    Token {
        /// User ID
        user_id: u64,
    },
}

/// Serializable view of a credential with the secret masked unless revealed.
#[derive(Debug, Serialize)]
pub struct CredentialView {
    /// Numeric user id.
    pub user_id: u64,
    /// Login name.
    pub login: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Public key, empty when never issued.
    pub public_key: String,
    /// Secret key, masked unless revealed.
    pub secret_key: String,
    /// Derived token.
    pub token: String,
    /// Both keys present.
    pub complete: bool,
}

impl CredentialView {
    fn new(credential: &UserCredential, reveal: bool) -> Self {
        Self {
            user_id: credential.user_id.as_u64(),
            login: credential.login.clone(),
            email: credential.email.clone(),
            display_name: credential.display_name.clone(),
            public_key: credential.public_key.clone(),
            secret_key: if reveal {
                credential.secret_key.clone()
            } else {
                mask_secret(&credential.secret_key, 4)
            },
            token: credential.token.clone(),
            complete: credential.is_complete(),
        }
    }
}

/// Result of `keys list`.
#[derive(Debug, Serialize)]
pub struct CredentialListOutput {
    /// Rows on this page.
    pub credentials: Vec<CredentialView>,
    /// 1-based page number.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
    /// Credentialed users overall.
    pub total: u64,
    /// Pages at this page size.
    pub total_pages: u64,
}

impl CredentialListOutput {
    fn from_page(page: &CredentialListPage, reveal: bool) -> Self {
        Self {
            credentials: page.records.iter().map(|c| CredentialView::new(c, reveal)).collect(),
            page: page.page_number,
            per_page: page.page_size,
            total: page.total_count,
            total_pages: page.total_pages(),
        }
    }
}

impl CommandOutput for CredentialListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["ID", "User", "Email", "Public Key", "Secret Key", "Token"]);

        for c in &self.credentials {
            table.add_row(vec![
                c.user_id.to_string(),
                truncate(&c.login, 24),
                truncate(&c.email, 32),
                colorize_key(&c.public_key).to_string(),
                colorize_key(&c.secret_key).to_string(),
                c.token.clone(),
            ]);
        }

        render_page("credential", table, self.credentials.len(), self.page, self.total_pages, self.total)
    }
}

/// Result of `keys show`.
#[derive(Debug, Serialize)]
pub struct CredentialDetailOutput {
    /// Requested user id.
    pub user_id: u64,
    /// `None` when the user does not exist.
    pub credential: Option<CredentialView>,
}

impl CommandOutput for CredentialDetailOutput {
    fn to_human(&self) -> String {
        let Some(c) = &self.credential else {
            return format!("User {} not found.", self.user_id);
        };

        let lines = [
            format!("User:       {} ({})", c.login, c.user_id),
            format!("Email:      {}", c.email),
            format!("Name:       {}", c.display_name),
            format!("Public key: {}", colorize_key(&c.public_key)),
            format!("Secret key: {}", colorize_key(&c.secret_key)),
            format!("Token:      {}", c.token),
            format!("State:      {}", colorize_completeness(c.complete)),
        ];
        lines.join("\n")
    }
}

/// Result of `keys count`.
#[derive(Debug, Serialize)]
pub struct CountOutput {
    /// Credentialed users.
    pub total: u64,
}

impl CommandOutput for CountOutput {
    fn to_human(&self) -> String {
        format!("{} credentialed user(s)", self.total)
    }
}

/// Result of `keys token`.
#[derive(Debug, Serialize)]
pub struct TokenOutput {
    /// Requested user id.
    pub user_id: u64,
    /// Derived token.
    pub token: String,
}

impl CommandOutput for TokenOutput {
    fn to_human(&self) -> String {
        self.token.clone()
    }
}

/// Run a `keys` subcommand.
pub async fn execute(args: KeysArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (credentials, _store) = build_credential_store(config).await?;

    match args.command {
        KeysCommands::List { page, per_page, reveal } => {
            let per_page = per_page.unwrap_or(config.listing.per_page);
            let listing = credentials
                .list_page(page, per_page)
                .await
                .context("Failed to list credentials")?;
            output(&CredentialListOutput::from_page(&listing, reveal), json_mode);
        }

        KeysCommands::Show { user_id, reveal } => {
            let credential = credentials
                .get_credential(UserId::new(user_id))
                .await
                .context("Failed to load credential")?;
            let out = CredentialDetailOutput {
                user_id,
                credential: credential.as_ref().map(|c| CredentialView::new(c, reveal)),
            };
            output(&out, json_mode);
        }

        KeysCommands::Count => {
            let total = credentials
                .total_credentialed_users()
                .await
                .context("Failed to count credentialed users")?;
            output(&CountOutput { total }, json_mode);
        }

        KeysCommands::Token { user_id } => {
            let token = credentials
                .get_token(UserId::new(user_id))
                .await
                .context("Failed to derive token")?;
            output(&TokenOutput { user_id, token }, json_mode);
        }
    }

    Ok(())
}
