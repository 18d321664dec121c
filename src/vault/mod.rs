//! Vault module — encrypted credential storage.
//!
//! This module provides:
//! - `Credential` records and expiry dates (`credential`)
//! - The in-memory `CredentialStore` and its invariants (`store`)
//! - The master password record and strength policy (`master`)
//! - The on-disk vault file format (`codec`)
//! - The high-level `Vault` handle tying it all together (`handle`)

pub mod codec;
pub mod credential;
pub mod handle;
pub mod master;
pub mod store;

// Re-export the most commonly used items.
pub use credential::Credential;
pub use handle::Vault;
pub use master::{MasterPasswordManager, MasterRecord};
pub use store::{CredentialInput, CredentialStore};
