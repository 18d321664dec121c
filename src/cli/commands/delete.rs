//! `keyseal delete` — remove a credential from the vault.

use crate::cli::{confirm, output, unlock, Cli};
use crate::errors::Result;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force && !confirm(&format!("Delete credential '{id}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    let mut vault = unlock(cli)?;
    vault.delete_credential(id)?;

    output::success(&format!("Deleted credential '{id}'"));
    Ok(())
}
