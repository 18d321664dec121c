//! `keyseal add` — store a new credential.

use crate::cli::{output, prompt_secret, today, unlock, Cli};
use crate::errors::Result;
use crate::vault::CredentialInput;

/// Execute the `add` command.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    cli: &Cli,
    id: &str,
    username: Option<&str>,
    email: Option<&str>,
    generate: bool,
    length: usize,
    special: &str,
) -> Result<()> {
    let mut vault = unlock(cli)?;
    let email = email.unwrap_or(id).to_string();

    if generate {
        let secret = vault.add_generated_credential(
            id.to_string(),
            username.map(str::to_string),
            email,
            length,
            special,
            today(),
        )?;
        output::success(&format!("Stored credential '{id}' with a generated secret"));
        output::warning("The secret is shown once — store it now if you need it elsewhere:");
        println!("{}", secret.as_str());
    } else {
        let secret = prompt_secret()?;
        vault.add_credential(
            CredentialInput {
                id: id.to_string(),
                username: username.map(str::to_string),
                email,
                secret,
            },
            today(),
        )?;
        output::success(&format!("Stored credential '{id}'"));
    }

    Ok(())
}
