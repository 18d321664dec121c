use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{KeySealError, Result};

/// User-level configuration, loaded from `keyseal.toml` in the
/// application's config directory.
///
/// Every field has a sensible default so KeySeal works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File name of the vault inside the config directory.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// PBKDF2 round count for new vaults (default: 300 000).
    #[serde(default = "default_kdf_rounds")]
    pub kdf_rounds: u32,

    /// Seconds before a copied secret is cleared from the clipboard.
    #[serde(default = "default_clipboard_clear_secs")]
    pub clipboard_clear_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    "keyseal.vault".to_string()
}

fn default_kdf_rounds() -> u32 {
    crate::crypto::DEFAULT_ROUNDS
}

fn default_clipboard_clear_secs() -> u64 {
    20
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            kdf_rounds: default_kdf_rounds(),
            clipboard_clear_secs: default_clipboard_clear_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    const FILE_NAME: &'static str = "keyseal.toml";

    /// Load settings from `<config_dir>/keyseal.toml`.
    ///
    /// If the file does not exist, defaults are returned. If the file
    /// exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            KeySealError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path to the vault file inside `config_dir`.
    pub fn vault_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.vault_file)
    }
}

/// Resolve the platform config directory for KeySeal.
///
/// `~/.config/keyseal` on Linux, the platform equivalent elsewhere.
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("keyseal"))
        .ok_or(KeySealError::UnsupportedPlatform)
}

// ── Tests ────────────────────────────────────────────────────────────
