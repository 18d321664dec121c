use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in KeySeal.
#[derive(Debug, Error)]
pub enum KeySealError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Invalid crypto argument: {0}")]
    InvalidCryptoArgument(String),

    // --- Vault errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Wrong master password")]
    WrongMasterPassword,

    #[error("No master password has been set yet")]
    MasterPasswordUnset,

    // --- Credential errors ---
    #[error("Credential '{0}' not found")]
    CredentialNotFound(String),

    #[error("Credential '{0}' already exists — choose a unique id")]
    CredentialExists(String),

    #[error("Credential is incomplete — id, email, and secret are all required")]
    IncompleteCredential,

    #[error("Id '{0}' is not a valid e-mail address")]
    InvalidIdFormat(String),

    // --- Master password policy errors ---
    #[error("New password is equal to the current one — choose a different password")]
    PasswordUnchanged,

    #[error("Password is too weak: {0}")]
    WeakPassword(String),

    // --- Platform errors ---
    #[error("Could not resolve a configuration directory on this platform")]
    UnsupportedPlatform,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Clipboard error: {0}")]
    ClipboardError(String),
}

/// Convenience type alias for KeySeal results.
pub type Result<T> = std::result::Result<T, KeySealError>;
