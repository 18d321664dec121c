//! `keyseal reset` — wipe the vault and delete its file.

use crate::cli::{confirm, output, unlock, Cli};
use crate::errors::Result;

/// Execute the `reset` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    if !force
        && !confirm(
            "Resetting the vault deletes every stored credential, permanently. Proceed?",
        )?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    // Unlocking first means only someone who knows the master password
    // can destroy the vault.
    let vault = unlock(cli)?;
    vault.reset()?;

    output::success("Vault reset — all credentials deleted.");
    Ok(())
}
