//! Master password lifecycle: the single salted-hash record that is the
//! vault's root of trust, plus the strength policy applied before any
//! new password is accepted.

use chrono::NaiveDate;

use super::credential::expiry_date;
use crate::crypto::{CryptoEngine, ALLOWED_SPECIAL_CHARS, HASH_LEN};
use crate::errors::{KeySealError, Result};

/// Minimum total password length.
const MIN_LEN: usize = 10;
/// Minimum number of lowercase characters.
const MIN_LOWER: usize = 1;
/// Minimum number of uppercase characters.
const MIN_UPPER: usize = 1;
/// Minimum number of digits.
const MIN_DIGITS: usize = 1;
/// Minimum number of special characters from the allowed set.
const MIN_SPECIAL: usize = 1;

/// The stored master-password record: salted hash, the salt used, and
/// the expiry recomputed every time the password is set. The plaintext
/// password is never stored anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRecord {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
    pub expires_at: NaiveDate,
}

/// Owns the vault's single master-password record.
///
/// Two states: unset (no record, the initial state) and set. Most
/// operations are preconditioned on the record existing.
#[derive(Debug, Default)]
pub struct MasterPasswordManager {
    record: Option<MasterRecord>,
}

impl MasterPasswordManager {
    pub fn new() -> Self {
        Self { record: None }
    }

    /// Whether a master password has been set.
    pub fn is_set(&self) -> bool {
        self.record.is_some()
    }

    /// Set a new master password, replacing any existing record.
    ///
    /// From the set state, a password identical to the current one is
    /// rejected before the strength check. The new record's expiry is
    /// `today` plus the fixed validity window.
    pub fn set_new(
        &mut self,
        engine: &mut CryptoEngine,
        new_pwd: &str,
        today: NaiveDate,
    ) -> Result<()> {
        if self.record.is_some() && self.verify(engine, new_pwd)? {
            return Err(KeySealError::PasswordUnchanged);
        }

        check_strength(new_pwd)?;

        let (hash, salt) = engine.compute_hash(new_pwd, HASH_LEN)?;
        self.record = Some(MasterRecord {
            hash,
            salt,
            expires_at: expiry_date(today),
        });
        Ok(())
    }

    /// Verify a candidate password against the stored record.
    ///
    /// Precondition error while unset.
    pub fn verify(&self, engine: &CryptoEngine, pwd: &str) -> Result<bool> {
        let record = self
            .record
            .as_ref()
            .ok_or(KeySealError::MasterPasswordUnset)?;
        engine.verify_hash(pwd, &record.hash, &record.salt)
    }

    /// Whether the master password's validity window has passed.
    ///
    /// Precondition error while unset.
    pub fn check_expired(&self, today: NaiveDate) -> Result<bool> {
        let record = self
            .record
            .as_ref()
            .ok_or(KeySealError::MasterPasswordUnset)?;
        Ok(today > record.expires_at)
    }

    /// The stored record, if any (used by the vault codec).
    pub fn record(&self) -> Option<&MasterRecord> {
        self.record.as_ref()
    }

    /// Restore a record loaded from the vault file.
    pub fn restore(&mut self, record: MasterRecord) {
        self.record = Some(record);
    }

    /// Return to the unset state.
    pub fn drop_content(&mut self) {
        self.record = None;
    }
}

/// The strength policy, as one composed predicate.
///
/// Character classes may overlap in the password, so each minimum is
/// counted independently in a single pass. Characters outside the
/// letter/digit/allowed-special classes make the password invalid.
fn check_strength(pwd: &str) -> Result<()> {
    let mut lower = 0usize;
    let mut upper = 0usize;
    let mut digits = 0usize;
    let mut special = 0usize;
    let mut foreign = 0usize;

    for c in pwd.chars() {
        if c.is_ascii_lowercase() {
            lower += 1;
        } else if c.is_ascii_uppercase() {
            upper += 1;
        } else if c.is_ascii_digit() {
            digits += 1;
        } else if ALLOWED_SPECIAL_CHARS.contains(c) {
            special += 1;
        } else {
            foreign += 1;
        }
    }

    let ok = pwd.chars().count() >= MIN_LEN
        && lower >= MIN_LOWER
        && upper >= MIN_UPPER
        && digits >= MIN_DIGITS
        && special >= MIN_SPECIAL
        && foreign == 0;

    if ok {
        Ok(())
    } else {
        Err(KeySealError::WeakPassword(format!(
            "a valid password must contain at least {MIN_LEN} total characters, \
             {MIN_LOWER} lowercase, {MIN_UPPER} uppercase, {MIN_DIGITS} digit(s), and \
             {MIN_SPECIAL} special character(s) from \"{ALLOWED_SPECIAL_CHARS}\", \
             with no other characters"
        )))
    }
}
