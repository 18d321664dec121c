//! CLI module — Clap argument parser, output helpers, and command
//! implementations.

pub mod clipboard;
pub mod commands;
pub mod output;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{config_dir, Settings};
use crate::errors::{KeySealError, Result};
use crate::vault::Vault;

/// KeySeal CLI: local encrypted credential vault.
#[derive(Parser)]
#[command(name = "keyseal", about = "Local encrypted credential vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file path (default: the platform config directory)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Master password (for scripting; omit for an interactive prompt)
    #[arg(long, env = "KEYSEAL_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault
    Init,

    /// Add a credential
    Add {
        /// Credential id (must be an e-mail address)
        id: String,

        /// Username, if different from the e-mail
        #[arg(short, long)]
        username: Option<String>,

        /// E-mail (defaults to the id)
        #[arg(short, long)]
        email: Option<String>,

        /// Generate the secret instead of prompting for it
        #[arg(short, long)]
        generate: bool,

        /// Length of the generated secret
        #[arg(long, default_value_t = 16)]
        length: usize,

        /// Special characters the generated secret may use
        /// (default: the full allowed set)
        #[arg(long, default_value = "")]
        special: String,
    },

    /// Show a credential (metadata by default)
    Get {
        /// Credential id
        id: String,

        /// Print the decrypted secret to stdout
        #[arg(long)]
        show: bool,

        /// Copy the decrypted secret to the clipboard (auto-clears)
        #[arg(long)]
        copy: bool,
    },

    /// List all credentials
    List,

    /// Update a credential
    Update {
        /// Credential id
        id: String,

        /// New id (rename)
        #[arg(long)]
        new_id: Option<String>,

        /// New username
        #[arg(short, long)]
        username: Option<String>,

        /// New e-mail
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Delete a credential
    Delete {
        /// Credential id
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change the master password (re-encrypts every secret)
    Rotate,

    /// Delete the vault and everything in it
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show expiry status of the master password and all credentials
    Status,

    /// Generate a policy-compliant random password (without storing it)
    Generate {
        /// Password length
        #[arg(long, default_value_t = 16)]
        length: usize,

        /// Special characters to draw from (default: the full allowed set)
        #[arg(long, default_value = "")]
        special: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from the platform config directory.
pub fn settings() -> Result<Settings> {
    Settings::load(&config_dir()?)
}

/// Resolve the vault file path: `--vault` flag, or the configured file
/// name inside the platform config directory.
pub fn vault_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.vault {
        return Ok(path.clone());
    }
    Ok(settings()?.vault_path(&config_dir()?))
}

/// Today's date, as the core sees it.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Get the master password: `--password` / `KEYSEAL_PASSWORD`, or an
/// interactive prompt.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on
/// drop.
pub fn master_password(cli: &Cli) -> Result<Zeroizing<String>> {
    if let Some(pw) = &cli.password {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw.clone()));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| KeySealError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used by `init`
/// and `rotate`). Strength is enforced by the core, not here.
pub fn prompt_new_master_password(cli: &Cli) -> Result<Zeroizing<String>> {
    if let Some(pw) = &cli.password {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw.clone()));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Choose a master password")
        .with_confirmation("Confirm master password", "Passwords do not match")
        .interact()
        .map_err(|e| KeySealError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a credential secret.
pub fn prompt_secret() -> Result<Zeroizing<String>> {
    let secret = dialoguer::Password::new()
        .with_prompt("Secret")
        .interact()
        .map_err(|e| KeySealError::CommandFailed(format!("secret prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Yes/no confirmation prompt.
pub fn confirm(msg: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(msg)
        .default(false)
        .interact()
        .map_err(|e| KeySealError::CommandFailed(format!("confirmation prompt: {e}")))
}

/// Resolve the path, get the password, and unlock the vault.
pub fn unlock(cli: &Cli) -> Result<Vault> {
    let path = vault_path(cli)?;
    let password = master_password(cli)?;
    Vault::unlock(path, &password)
}
