//! `keyseal generate` — print a policy-compliant random password
//! without storing anything. Works without an unlocked vault.

use crate::crypto::generate_password;
use crate::errors::Result;

/// Execute the `generate` command.
pub fn execute(length: usize, special: &str) -> Result<()> {
    let password = generate_password(length, special)?;
    println!("{password}");
    Ok(())
}
