//! Password-based key derivation using PBKDF2-HMAC-SHA512.
//!
//! PBKDF2 with a very high round count is the brute-force deterrent for
//! the whole vault: every AES key and every stored hash goes through it.
//! The round count is configurable (and recorded in the vault file so a
//! vault always reopens with the cost it was written with), but never
//! below `MIN_ROUNDS`.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha512;

use crate::errors::{KeySealError, Result};

/// Length of KDF salts in bytes (512 bits).
pub const SALT_LEN: usize = 64;

/// Length of derived AES keys in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Length of stored password hashes in bytes (512 bits).
pub const HASH_LEN: usize = 64;

/// Default PBKDF2 round count (OWASP-class work factor for SHA-512).
pub const DEFAULT_ROUNDS: u32 = 300_000;

/// Lowest round count we accept — mainly so tests can run fast without
/// allowing a production vault to be configured with a trivial cost.
pub const MIN_ROUNDS: u32 = 1_000;

/// Derive `out_len` bytes from a password and salt.
///
/// The same password + salt + rounds always produce the same output.
pub fn derive_bytes(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    out_len: usize,
) -> Result<Vec<u8>> {
    if rounds < MIN_ROUNDS {
        return Err(KeySealError::KeyDerivationFailed(format!(
            "PBKDF2 rounds must be at least {MIN_ROUNDS} (got {rounds})"
        )));
    }

    let mut out = vec![0u8; out_len];
    pbkdf2::<Hmac<Sha512>>(password, salt, rounds, &mut out)
        .map_err(|e| KeySealError::KeyDerivationFailed(format!("PBKDF2 failed: {e}")))?;
    Ok(out)
}

/// Derive a 32-byte AES-256 key from a password and salt.
pub fn derive_key(password: &[u8], salt: &[u8], rounds: u32) -> Result<[u8; KEY_LEN]> {
    let bytes = derive_bytes(password, salt, rounds, KEY_LEN)?;
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&bytes);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_output() {
        let salt = [7u8; SALT_LEN];
        let a = derive_bytes(b"pw", &salt, MIN_ROUNDS, 32).unwrap();
        let b = derive_bytes(b"pw", &salt, MIN_ROUNDS, 32).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_salts_different_output() {
        let a = derive_bytes(b"pw", &[1u8; SALT_LEN], MIN_ROUNDS, 32).unwrap();
        let b = derive_bytes(b"pw", &[2u8; SALT_LEN], MIN_ROUNDS, 32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rounds_below_floor_rejected() {
        let err = derive_bytes(b"pw", &[0u8; SALT_LEN], MIN_ROUNDS - 1, 32);
        assert!(err.is_err());
    }
}
