//! The credential record stored inside a vault.
//!
//! The secret is ciphertext at rest; plaintext only ever exists as a
//! transient return value of the store's reveal path. Each record
//! carries the AEAD parameters its secret was encrypted with, so it can
//! be decrypted (and re-keyed) independently of every other record.

use chrono::{Months, NaiveDate};

use crate::crypto::EncryptionParams;

/// How long a credential (or master password) stays valid, in months.
pub const EXPIRY_MONTHS: u32 = 3;

/// A single credential record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// User-chosen identifier; must be a syntactically valid e-mail.
    pub id: String,

    /// Optional username (an account may use the e-mail as username).
    pub username: Option<String>,

    /// E-mail display field.
    pub email: String,

    /// The encrypted secret.
    pub secret: Vec<u8>,

    /// Salt, nonce, and tag the secret was encrypted with.
    pub params: EncryptionParams,

    /// Date after which the user is advised to change the secret.
    pub expires_at: NaiveDate,
}

impl Credential {
    /// Build a record from an already-encrypted secret.
    ///
    /// The expiry is set to `today` plus the fixed validity window.
    pub fn new(
        id: String,
        username: Option<String>,
        email: String,
        secret: Vec<u8>,
        params: EncryptionParams,
        today: NaiveDate,
    ) -> Self {
        Self {
            id,
            username,
            email,
            secret,
            params,
            expires_at: expiry_date(today),
        }
    }

    /// Whether this credential's validity window has passed.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.expires_at
    }
}

/// Expiry date for something set on `today`.
pub fn expiry_date(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(EXPIRY_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}
