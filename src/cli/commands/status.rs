//! `keyseal status` — expiry report for the master password and all
//! credentials.

use crate::cli::{output, today, unlock, Cli};
use crate::errors::Result;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = unlock(cli)?;
    let now = today();

    if let Some(expiry) = vault.master_password_expiry() {
        if vault.master_password_expired(now)? {
            output::warning(&format!(
                "Master password expired on {} — run `keyseal rotate`.",
                expiry.format("%d/%m/%Y")
            ));
        } else {
            output::info(&format!(
                "Master password valid until {}.",
                expiry.format("%d/%m/%Y")
            ));
        }
    }

    let expired = vault.expired_credentials(now);
    if expired.is_empty() {
        output::success(&format!(
            "All {} credentials are within their validity window.",
            vault.credential_count()
        ));
    } else {
        output::warning(&format!("{} credential(s) expired:", expired.len()));
        for id in expired {
            println!("  {id}");
        }
    }

    Ok(())
}
