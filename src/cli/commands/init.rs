//! `keyseal init` — create a new vault.

use crate::cli::{output, prompt_new_master_password, settings, today, vault_path, Cli};
use crate::errors::{KeySealError, Result};
use crate::vault::Vault;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;

    if path.exists() {
        output::tip("Run `keyseal reset` first if you really want to start over.");
        return Err(KeySealError::VaultAlreadyExists(path));
    }

    let password = prompt_new_master_password(cli)?;
    let settings = settings()?;

    let vault = Vault::create(path, &password, settings.kdf_rounds, today())?;

    output::success(&format!("Vault created at {}", vault.path().display()));
    output::tip("Run `keyseal add <ID>` to store a credential.");
    output::tip("Run `keyseal list` to see everything in the vault.");
    Ok(())
}
