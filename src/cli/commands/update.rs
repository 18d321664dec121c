//! `keyseal update` — change a credential's fields and secret.
//!
//! The secret is always re-entered and re-encrypted; id, username, and
//! e-mail keep their current values unless overridden.

use crate::cli::{output, prompt_secret, today, unlock, Cli};
use crate::errors::Result;
use crate::vault::CredentialInput;

/// Execute the `update` command.
pub fn execute(
    cli: &Cli,
    id: &str,
    new_id: Option<&str>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<()> {
    let mut vault = unlock(cli)?;
    let current = vault.read_credential(id)?;

    let secret = prompt_secret()?;
    let input = CredentialInput {
        id: new_id.unwrap_or(id).to_string(),
        username: username.map(str::to_string).or(current.username),
        email: email.map(str::to_string).unwrap_or(current.email),
        secret,
    };
    let renamed = input.id != id;
    let final_id = input.id.clone();

    vault.update_credential(id, input, today())?;

    if renamed {
        output::success(&format!("Updated credential '{id}' (now '{final_id}')"));
    } else {
        output::success(&format!("Updated credential '{id}'"));
    }
    Ok(())
}
