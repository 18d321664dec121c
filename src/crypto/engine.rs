//! The crypto engine: AES-256-GCM with detached tags, PBKDF2 hashing,
//! and the nonce/salt anti-reuse history.
//!
//! A GCM nonce must never repeat under the same key, and that guarantee
//! has to hold across process restarts, so the engine remembers every
//! nonce and salt it has ever produced and the vault codec persists
//! both sets alongside the credentials.

use std::collections::BTreeSet;

use aes_gcm::aead::KeyInit;
use aes_gcm::{AeadInPlace, Aes256Gcm, Nonce, Tag};
use rand::rngs::OsRng;
use rand::TryRngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::kdf::{self, SALT_LEN};
use crate::errors::{KeySealError, Result};

/// Size of the AES-256-GCM nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// The AEAD parameters produced by one encryption: the KDF salt the key
/// was derived with, the GCM nonce, and the authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionParams {
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Stateless-per-call crypto primitives plus the anti-reuse history.
///
/// Construct one per vault and thread it through explicitly — there is
/// no global instance.
pub struct CryptoEngine {
    kdf_rounds: u32,
    used_nonces: BTreeSet<Vec<u8>>,
    used_salts: BTreeSet<Vec<u8>>,
}

impl Default for CryptoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoEngine {
    /// Engine with the default PBKDF2 work factor.
    pub fn new() -> Self {
        Self {
            kdf_rounds: kdf::DEFAULT_ROUNDS,
            used_nonces: BTreeSet::new(),
            used_salts: BTreeSet::new(),
        }
    }

    /// Engine with an explicit PBKDF2 round count (floor-checked).
    pub fn with_rounds(rounds: u32) -> Result<Self> {
        if rounds < kdf::MIN_ROUNDS {
            return Err(KeySealError::KeyDerivationFailed(format!(
                "PBKDF2 rounds must be at least {} (got {rounds})",
                kdf::MIN_ROUNDS
            )));
        }
        Ok(Self {
            kdf_rounds: rounds,
            used_nonces: BTreeSet::new(),
            used_salts: BTreeSet::new(),
        })
    }

    /// The PBKDF2 round count this engine derives with.
    pub fn kdf_rounds(&self) -> u32 {
        self.kdf_rounds
    }

    // ------------------------------------------------------------------
    // Hashing
    // ------------------------------------------------------------------

    /// Hash `input` with a fresh never-before-used salt.
    ///
    /// Returns `(hash, salt)`; the salt is recorded in the salt history.
    pub fn compute_hash(&mut self, input: &str, hash_len: usize) -> Result<(Vec<u8>, Vec<u8>)> {
        let salt = draw_unique(SALT_LEN, &mut self.used_salts)?;
        let hash = kdf::derive_bytes(input.as_bytes(), &salt, self.kdf_rounds, hash_len)?;
        Ok((hash, salt))
    }

    /// Recompute the hash of `input` under `salt` and compare to `hash`.
    ///
    /// The comparison is constant-time over the hash contents.
    pub fn verify_hash(&self, input: &str, hash: &[u8], salt: &[u8]) -> Result<bool> {
        let mut computed = kdf::derive_bytes(input.as_bytes(), salt, self.kdf_rounds, hash.len())?;
        let equal: bool = computed.as_slice().ct_eq(hash).into();
        computed.zeroize();
        Ok(equal)
    }

    // ------------------------------------------------------------------
    // Authenticated encryption
    // ------------------------------------------------------------------

    /// Encrypt `plaintext` under a key derived from `passphrase`.
    ///
    /// Generates a fresh KDF salt and a fresh 96-bit nonce (both drawn
    /// through the anti-reuse loop), derives an AES-256 key, and runs
    /// AES-GCM with a detached 128-bit tag.
    pub fn encrypt(
        &mut self,
        plaintext: &[u8],
        passphrase: &str,
    ) -> Result<(Vec<u8>, EncryptionParams)> {
        let salt = draw_unique(SALT_LEN, &mut self.used_salts)?;
        let nonce = draw_unique(NONCE_LEN, &mut self.used_nonces)?;

        let mut key = kdf::derive_key(passphrase.as_bytes(), &salt, self.kdf_rounds)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| KeySealError::EncryptionFailed(format!("invalid key length: {e}")))?;
        key.zeroize();

        let mut buf = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buf)
            .map_err(|e| KeySealError::EncryptionFailed(format!("AES-GCM error: {e}")))?;

        Ok((
            buf,
            EncryptionParams {
                salt,
                nonce,
                tag: tag.to_vec(),
            },
        ))
    }

    /// Decrypt `ciphertext` with `passphrase` and its stored parameters.
    ///
    /// Fails with an argument error if the nonce or tag has the wrong
    /// length, and with an authentication error if the tag does not
    /// verify (wrong key or tampered ciphertext).
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        passphrase: &str,
        params: &EncryptionParams,
    ) -> Result<Vec<u8>> {
        if params.nonce.len() != NONCE_LEN {
            return Err(KeySealError::InvalidCryptoArgument(format!(
                "nonce must be {NONCE_LEN} bytes (96 bits), got {}",
                params.nonce.len()
            )));
        }
        if params.tag.len() != TAG_LEN {
            return Err(KeySealError::InvalidCryptoArgument(format!(
                "tag must be {TAG_LEN} bytes (128 bits), got {}",
                params.tag.len()
            )));
        }

        let mut key = kdf::derive_key(passphrase.as_bytes(), &params.salt, self.kdf_rounds)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| KeySealError::DecryptionFailed)?;
        key.zeroize();

        let mut buf = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(&params.nonce),
                b"",
                &mut buf,
                Tag::from_slice(&params.tag),
            )
            .map_err(|_| KeySealError::DecryptionFailed)?;

        Ok(buf)
    }

    // ------------------------------------------------------------------
    // History access (used by the vault codec)
    // ------------------------------------------------------------------

    /// Every nonce this engine has ever produced.
    pub fn nonce_history(&self) -> &BTreeSet<Vec<u8>> {
        &self.used_nonces
    }

    /// Every KDF salt this engine has ever produced.
    pub fn salt_history(&self) -> &BTreeSet<Vec<u8>> {
        &self.used_salts
    }

    /// Restore both history sets verbatim (on vault load).
    pub fn restore_history(&mut self, nonces: BTreeSet<Vec<u8>>, salts: BTreeSet<Vec<u8>>) {
        self.used_nonces = nonces;
        self.used_salts = salts;
    }

    /// Drop both history sets (on vault reset).
    pub fn drop_history(&mut self) {
        self.used_nonces.clear();
        self.used_salts.clear();
    }
}

/// Draw a `len`-byte random value that has never been seen in `history`.
///
/// Rejects the all-zero candidate and anything already in the set, then
/// records the accepted value. The loop terminates on the first draw for
/// any working random source; it guards against a broken one.
fn draw_unique(len: usize, history: &mut BTreeSet<Vec<u8>>) -> Result<Vec<u8>> {
    let mut candidate = vec![0u8; len];
    loop {
        OsRng
            .try_fill_bytes(&mut candidate)
            .map_err(|e| KeySealError::EncryptionFailed(format!("OS RNG failure: {e}")))?;

        if candidate.iter().all(|&b| b == 0) {
            continue;
        }
        if !history.contains(&candidate) {
            history.insert(candidate.clone());
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::{HASH_LEN, MIN_ROUNDS};

    fn engine() -> CryptoEngine {
        CryptoEngine::with_rounds(MIN_ROUNDS).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let mut e = engine();
        let (ct, params) = e.encrypt(b"hunter2", "master").unwrap();
        assert_eq!(ct.len(), 7);
        assert_eq!(params.nonce.len(), NONCE_LEN);
        assert_eq!(params.tag.len(), TAG_LEN);

        let pt = e.decrypt(&ct, "master", &params).unwrap();
        assert_eq!(pt, b"hunter2");
    }

    #[test]
    fn decrypt_with_wrong_passphrase_fails() {
        let mut e = engine();
        let (ct, params) = e.encrypt(b"secret", "right").unwrap();
        let err = e.decrypt(&ct, "wrong", &params).unwrap_err();
        assert!(matches!(err, KeySealError::DecryptionFailed));
    }

    #[test]
    fn decrypt_with_tampered_ciphertext_fails() {
        let mut e = engine();
        let (mut ct, params) = e.encrypt(b"secret", "pw").unwrap();
        ct[0] ^= 0xFF;
        assert!(e.decrypt(&ct, "pw", &params).is_err());
    }

    #[test]
    fn decrypt_rejects_bad_nonce_and_tag_sizes() {
        let mut e = engine();
        let (ct, params) = e.encrypt(b"x", "pw").unwrap();

        let mut short_nonce = params.clone();
        short_nonce.nonce.truncate(8);
        assert!(matches!(
            e.decrypt(&ct, "pw", &short_nonce).unwrap_err(),
            KeySealError::InvalidCryptoArgument(_)
        ));

        let mut short_tag = params;
        short_tag.tag.truncate(10);
        assert!(matches!(
            e.decrypt(&ct, "pw", &short_tag).unwrap_err(),
            KeySealError::InvalidCryptoArgument(_)
        ));
    }

    #[test]
    fn compute_and_verify_hash() {
        let mut e = engine();
        let (hash, salt) = e.compute_hash("pa55word", 64).unwrap();
        assert_eq!(salt.len(), SALT_LEN);
        assert_eq!(hash.len(), HASH_LEN);

        assert!(e.verify_hash("pa55word", &hash, &salt).unwrap());
        assert!(!e.verify_hash("other", &hash, &salt).unwrap());
    }

    #[test]
    fn generated_values_are_recorded_and_unique() {
        let mut e = engine();
        for _ in 0..8 {
            e.encrypt(b"m", "pw").unwrap();
        }
        // 8 encryptions produce 8 distinct nonces and 8 distinct salts.
        assert_eq!(e.nonce_history().len(), 8);
        assert_eq!(e.salt_history().len(), 8);
    }

    #[test]
    fn restored_history_prevents_reuse() {
        let mut e = engine();
        let (_, params) = e.encrypt(b"m", "pw").unwrap();

        let mut e2 = engine();
        e2.restore_history(e.nonce_history().clone(), e.salt_history().clone());
        assert!(e2.nonce_history().contains(&params.nonce));

        // A fresh draw from the restored engine never repeats the old nonce.
        let (_, params2) = e2.encrypt(b"m", "pw").unwrap();
        assert_ne!(params.nonce, params2.nonce);
        assert_eq!(e2.nonce_history().len(), 2);
    }
}
