//! High-level vault operations used by the CLI.
//!
//! `Vault` owns the crypto engine, the credential store, and the master
//! password manager, and re-saves the file after every mutation. It is
//! the single exclusive owner of the open vault: every logical
//! operation runs to completion under one `&mut self` borrow, so an
//! add-credential and a change-master-password can never interleave
//! their file-write phases.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use zeroize::Zeroizing;

use super::codec;
use super::credential::Credential;
use super::master::MasterPasswordManager;
use super::store::{CredentialInput, CredentialStore};
use crate::crypto::{generate_password, CryptoEngine};
use crate::errors::{KeySealError, Result};

/// An open (unlocked) vault.
pub struct Vault {
    /// Path to the vault file on disk.
    path: PathBuf,

    engine: CryptoEngine,
    store: CredentialStore,
    master: MasterPasswordManager,

    /// The session's master password, wiped on drop. Needed because
    /// every credential encryption derives a fresh key from it.
    master_pwd: Zeroizing<String>,
}

/// The session password must never appear in debug output.
impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("path", &self.path)
            .field("credentials", &self.store.len())
            .field("master_pwd", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new vault file at `path`.
    ///
    /// The password must pass the strength policy. Fails if a vault
    /// file already exists — reset it first.
    pub fn create(
        path: PathBuf,
        master_pwd: &str,
        kdf_rounds: u32,
        today: NaiveDate,
    ) -> Result<Self> {
        if path.exists() {
            return Err(KeySealError::VaultAlreadyExists(path));
        }

        let mut engine = CryptoEngine::with_rounds(kdf_rounds)?;
        let mut master = MasterPasswordManager::new();
        master.set_new(&mut engine, master_pwd, today)?;

        let mut vault = Self {
            path,
            engine,
            store: CredentialStore::new(),
            master,
            master_pwd: Zeroizing::new(master_pwd.to_string()),
        };
        vault.save()?;
        Ok(vault)
    }

    /// Unlock an existing vault file.
    ///
    /// Fails not-found if the file is absent and wrong-password if the
    /// candidate does not verify against the stored master hash.
    pub fn unlock(path: PathBuf, master_pwd: &str) -> Result<Self> {
        let loaded = codec::load(&path, master_pwd)?;

        let mut master = MasterPasswordManager::new();
        master.restore(loaded.master);

        let mut store = CredentialStore::new();
        store.restore(loaded.credentials);

        Ok(Self {
            path,
            engine: loaded.engine,
            store,
            master,
            master_pwd: Zeroizing::new(master_pwd.to_string()),
        })
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    /// Add a credential with a caller-supplied secret.
    pub fn add_credential(&mut self, input: CredentialInput, today: NaiveDate) -> Result<()> {
        self.store
            .create(&mut self.engine, &self.master_pwd, input, today)?;
        self.save()
    }

    /// Add a credential with a generated secret.
    ///
    /// Returns the generated plaintext so the caller can show it once.
    pub fn add_generated_credential(
        &mut self,
        id: String,
        username: Option<String>,
        email: String,
        length: usize,
        special: &str,
        today: NaiveDate,
    ) -> Result<Zeroizing<String>> {
        let secret = Zeroizing::new(generate_password(length, special)?);
        self.store.create(
            &mut self.engine,
            &self.master_pwd,
            CredentialInput {
                id,
                username,
                email,
                secret: secret.clone(),
            },
            today,
        )?;
        self.save()?;
        Ok(secret)
    }

    /// A copy of one credential record (secret stays encrypted).
    pub fn read_credential(&self, id: &str) -> Result<Credential> {
        self.store.read(id)
    }

    /// Decrypt one credential's secret.
    pub fn reveal_secret(&self, id: &str) -> Result<Zeroizing<String>> {
        self.store.reveal(&self.engine, &self.master_pwd, id)
    }

    /// Copies of all credential records, ordered by id.
    pub fn list_credentials(&self) -> Vec<Credential> {
        self.store.list_all()
    }

    /// Update a credential's fields (and re-encrypt its secret).
    pub fn update_credential(
        &mut self,
        id: &str,
        input: CredentialInput,
        today: NaiveDate,
    ) -> Result<()> {
        self.store
            .update(id, &mut self.engine, &self.master_pwd, input, today)?;
        self.save()
    }

    /// Delete a credential.
    pub fn delete_credential(&mut self, id: &str) -> Result<()> {
        self.store.delete(id)?;
        self.save()
    }

    // ------------------------------------------------------------------
    // Master password
    // ------------------------------------------------------------------

    /// Change the master password and re-key every stored secret.
    ///
    /// The old password is fully validated against the master record
    /// before any record is touched.
    pub fn change_master_password(
        &mut self,
        old_pwd: &str,
        new_pwd: &str,
        today: NaiveDate,
    ) -> Result<()> {
        if !self.master.verify(&self.engine, old_pwd)? {
            return Err(KeySealError::WrongMasterPassword);
        }

        self.master.set_new(&mut self.engine, new_pwd, today)?;
        self.store
            .update_encryption(&mut self.engine, old_pwd, new_pwd)?;
        self.master_pwd = Zeroizing::new(new_pwd.to_string());
        self.save()
    }

    /// Whether the master password's validity window has passed.
    pub fn master_password_expired(&self, today: NaiveDate) -> Result<bool> {
        self.master.check_expired(today)
    }

    /// The master password's expiry date.
    pub fn master_password_expiry(&self) -> Option<NaiveDate> {
        self.master.record().map(|r| r.expires_at)
    }

    /// Ids of every credential past its expiry date.
    pub fn expired_credentials(&self, today: NaiveDate) -> Vec<String> {
        self.store.check_expiration(today)
    }

    // ------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------

    /// Wipe the store, the master record, the history sets, and delete
    /// the vault file. Irreversible.
    pub fn reset(mut self) -> Result<()> {
        codec::delete(&self.path)?;
        self.store.drop_content();
        self.master.drop_content();
        self.engine.drop_history();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn credential_count(&self) -> usize {
        self.store.len()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the whole vault state and overwrite the file.
    fn save(&mut self) -> Result<()> {
        let master = self
            .master
            .record()
            .ok_or(KeySealError::MasterPasswordUnset)?
            .clone();
        let credentials = self.store.list_all();
        codec::save(
            &self.path,
            &self.master_pwd,
            &master,
            &credentials,
            &mut self.engine,
        )
    }
}
