//! The in-memory credential store.
//!
//! A `BTreeMap` keyed by the user-chosen identifier, with the store's
//! invariants (uniqueness, completeness, id format) enforced at every
//! mutation. Secrets are handed in as plaintext and encrypted through
//! the crypto engine before they are stored; the store never keeps
//! plaintext.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use zeroize::{Zeroize, Zeroizing};

use super::credential::Credential;
use crate::crypto::CryptoEngine;
use crate::errors::{KeySealError, Result};

/// An id must look like an e-mail: something, `@`, something, `.`,
/// something, no whitespace anywhere. Deliberately loose so any format
/// a service accepts will pass.
fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid id pattern"))
}

/// Plaintext field values for a credential being created or updated.
///
/// The secret is wrapped in `Zeroizing` so it is wiped when the input
/// goes out of scope.
pub struct CredentialInput {
    pub id: String,
    pub username: Option<String>,
    pub email: String,
    pub secret: Zeroizing<String>,
}

impl CredentialInput {
    /// A credential is complete only if id, email, and secret are all
    /// non-empty.
    fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.email.is_empty() && !self.secret.is_empty()
    }
}

/// In-memory map of credential records, keyed by id.
#[derive(Default)]
pub struct CredentialStore {
    records: BTreeMap<String, Credential>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Insert a new credential, encrypting its secret with the current
    /// master password.
    ///
    /// Fails with a duplicate error if the id exists, an incompleteness
    /// error if id/email/secret are not all non-empty, and a format
    /// error if the id is not a valid e-mail.
    pub fn create(
        &mut self,
        engine: &mut CryptoEngine,
        master_pwd: &str,
        input: CredentialInput,
        today: NaiveDate,
    ) -> Result<()> {
        if self.records.contains_key(&input.id) {
            return Err(KeySealError::CredentialExists(input.id));
        }
        if !input.is_complete() {
            return Err(KeySealError::IncompleteCredential);
        }
        if !id_pattern().is_match(&input.id) {
            return Err(KeySealError::InvalidIdFormat(input.id));
        }

        let (ciphertext, params) = engine.encrypt(input.secret.as_bytes(), master_pwd)?;
        let record = Credential::new(
            input.id.clone(),
            input.username,
            input.email,
            ciphertext,
            params,
            today,
        );
        self.records.insert(input.id, record);
        Ok(())
    }

    /// Return a copy of the credential with the given id.
    ///
    /// A copy, so callers cannot mutate the store through the result.
    pub fn read(&self, id: &str) -> Result<Credential> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| KeySealError::CredentialNotFound(id.to_string()))
    }

    /// Replace the credential stored under `id` with new field values,
    /// re-encrypting the secret.
    ///
    /// If the id changed, the record is re-keyed under the new id as a
    /// single logical rename inside this call — no caller can observe
    /// the credential at neither key. A rename onto an id that already
    /// belongs to another record is a duplicate error.
    pub fn update(
        &mut self,
        id: &str,
        engine: &mut CryptoEngine,
        master_pwd: &str,
        input: CredentialInput,
        today: NaiveDate,
    ) -> Result<()> {
        if !self.records.contains_key(id) {
            return Err(KeySealError::CredentialNotFound(id.to_string()));
        }
        // A rename must not clobber another credential.
        if id != input.id && self.records.contains_key(&input.id) {
            return Err(KeySealError::CredentialExists(input.id));
        }
        if !input.is_complete() {
            return Err(KeySealError::IncompleteCredential);
        }
        if !id_pattern().is_match(&input.id) {
            return Err(KeySealError::InvalidIdFormat(input.id));
        }

        let (ciphertext, params) = engine.encrypt(input.secret.as_bytes(), master_pwd)?;
        let record = Credential::new(
            input.id.clone(),
            input.username,
            input.email,
            ciphertext,
            params,
            today,
        );

        if id == input.id {
            self.records.insert(input.id, record);
        } else {
            // Rename: remove the old key and insert under the new one.
            self.records.remove(id);
            self.records.insert(input.id, record);
        }
        Ok(())
    }

    /// Remove the credential with the given id.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        if self.records.remove(id).is_none() {
            return Err(KeySealError::CredentialNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Copies of every stored credential, ordered by id.
    pub fn list_all(&self) -> Vec<Credential> {
        self.records.values().cloned().collect()
    }

    /// Decrypt and return one credential's plaintext secret.
    pub fn reveal(
        &self,
        engine: &CryptoEngine,
        master_pwd: &str,
        id: &str,
    ) -> Result<Zeroizing<String>> {
        let record = self
            .records
            .get(id)
            .ok_or_else(|| KeySealError::CredentialNotFound(id.to_string()))?;

        let plaintext = engine.decrypt(&record.secret, master_pwd, &record.params)?;
        String::from_utf8(plaintext).map(Zeroizing::new).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            KeySealError::InvalidVaultFormat("secret is not valid UTF-8".to_string())
        })
    }

    /// Ids of every credential whose expiry is in the past.
    pub fn check_expiration(&self, today: NaiveDate) -> Vec<String> {
        self.records
            .values()
            .filter(|c| c.is_expired(today))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Re-encrypt every secret under a new master password.
    ///
    /// Two-phase so the store is never left half re-keyed: first every
    /// secret is decrypted with the old password (any failure aborts
    /// with the store untouched), then all of them are re-encrypted
    /// with fresh parameters under the new password.
    pub fn update_encryption(
        &mut self,
        engine: &mut CryptoEngine,
        old_master_pwd: &str,
        new_master_pwd: &str,
    ) -> Result<()> {
        let mut plaintexts: Vec<(String, Zeroizing<Vec<u8>>)> =
            Vec::with_capacity(self.records.len());
        for record in self.records.values() {
            let plaintext = engine.decrypt(&record.secret, old_master_pwd, &record.params)?;
            plaintexts.push((record.id.clone(), Zeroizing::new(plaintext)));
        }

        for (id, plaintext) in plaintexts {
            let (ciphertext, params) = engine.encrypt(&plaintext, new_master_pwd)?;
            if let Some(record) = self.records.get_mut(&id) {
                record.secret = ciphertext;
                record.params = params;
            }
        }
        Ok(())
    }

    /// Bulk-insert already-encrypted records (on vault load).
    pub fn restore(&mut self, records: Vec<Credential>) {
        for record in records {
            self.records.insert(record.id.clone(), record);
        }
    }

    /// Clear the entire store.
    pub fn drop_content(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
