//! `keyseal rotate` — change the master password.
//!
//! Verifies the old password, applies the strength policy to the new
//! one, re-encrypts every stored secret, and overwrites the vault file.

use zeroize::Zeroizing;

use crate::cli::{master_password, output, today, vault_path, Cli};
use crate::errors::{KeySealError, Result};
use crate::vault::Vault;

/// Execute the `rotate` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;

    output::info("Enter your current master password.");
    let old_password = master_password(cli)?;
    let mut vault = Vault::unlock(path, &old_password)?;

    output::info("Choose your new master password.");
    let new_password = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("New master password")
            .with_confirmation("Confirm new master password", "Passwords do not match")
            .interact()
            .map_err(|e| KeySealError::CommandFailed(format!("password prompt: {e}")))?,
    );

    vault.change_master_password(&old_password, &new_password, today())?;

    output::success(&format!(
        "Master password changed ({} credentials re-encrypted)",
        vault.credential_count()
    ));
    Ok(())
}
