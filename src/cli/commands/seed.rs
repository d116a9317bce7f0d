//! `seed-user`: write a fixture user into the local store.
//!
//! A development aid for exercising the listing; key issuance for real
//! users is handled elsewhere.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, UserId, UserRecord};
use crate::infrastructure::setup::build_credential_store;

/// Arguments of `seed-user`.
#[derive(Args, Debug)]
pub struct SeedUserArgs {
    /// User ID (non-zero)
    pub id: u64,
    /// Login name
    pub login: String,
    /// Email address
    pub email: String,
    /// Public key to store
    #[arg(long, requires = "secret_key")]
    pub public_key: Option<String>,
    /// Secret key to store
    #[arg(long, requires = "public_key")]
    pub secret_key: Option<String>,
}

/// Result of `seed-user`.
#[derive(Debug, Serialize)]
pub struct SeedOutput {
    /// Seeded user id.
    pub user_id: u64,
    /// Seeded login.
    pub login: String,
    /// Whether a key pair was written.
    pub credentialed: bool,
}

impl CommandOutput for SeedOutput {
    fn to_human(&self) -> String {
        if self.credentialed {
            format!("Seeded user {} ({}) with a key pair", self.login, self.user_id)
        } else {
            format!("Seeded user {} ({})", self.login, self.user_id)
        }
    }
}

/// Run `seed-user`.
pub async fn execute(args: SeedUserArgs, config: &Config, json_mode: bool) -> Result<()> {
    let user_id = UserId::new(args.id);
    if user_id.is_empty() {
        bail!("user id must be non-zero");
    }

    let (credentials, store) = build_credential_store(config).await?;

    store
        .insert_user(&UserRecord::new(user_id, args.login.clone(), args.email))
        .await
        .context("Failed to write user")?;

    let credentialed = match (args.public_key, args.secret_key) {
        (Some(public_key), Some(secret_key)) => {
            store
                .put_credential(user_id, &public_key, &secret_key)
                .await
                .context("Failed to write key pair")?;
            credentials.invalidate_user(user_id).await;
            credentials.invalidate_count().await;
            true
        }
        _ => false,
    };

    output(
        &SeedOutput {
            user_id: args.id,
            login: args.login,
            credentialed,
        },
        json_mode,
    );
    Ok(())
}
