//! Cryptographic primitives for KeySeal.
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with nonce/salt anti-reuse (`engine`)
//! - PBKDF2-HMAC-SHA512 password-based key derivation (`kdf`)
//! - Policy-compliant random password generation (`generator`)

pub mod engine;
pub mod generator;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{CryptoEngine, EncryptionParams, ...};
pub use engine::{CryptoEngine, EncryptionParams, NONCE_LEN, TAG_LEN};
pub use generator::{generate_password, ALLOWED_SPECIAL_CHARS};
pub use kdf::{DEFAULT_ROUNDS, HASH_LEN, KEY_LEN, MIN_ROUNDS, SALT_LEN};
