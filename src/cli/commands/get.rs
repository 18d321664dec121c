//! `keyseal get` — show one credential, optionally revealing or
//! copying its secret.

use crate::cli::{clipboard, output, settings, unlock, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: &str, show: bool, copy: bool) -> Result<()> {
    let vault = unlock(cli)?;
    let record = vault.read_credential(id)?;

    output::print_credentials_table(std::slice::from_ref(&record));

    if show {
        let secret = vault.reveal_secret(id)?;
        println!("{}", secret.as_str());
    }

    if copy {
        let clear_secs = settings()?.clipboard_clear_secs;
        let secret = vault.reveal_secret(id)?;
        output::info(&format!(
            "Secret copied to clipboard — clearing in {clear_secs}s."
        ));
        clipboard::copy_with_clear(&secret, clear_secs)?;
        output::info("Clipboard cleared.");
    }

    Ok(())
}
