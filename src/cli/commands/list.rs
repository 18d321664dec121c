//! `keyseal list` — show all credentials (metadata only).

use crate::cli::{output, unlock, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = unlock(cli)?;
    output::print_credentials_table(&vault.list_credentials());
    Ok(())
}
