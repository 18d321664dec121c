//! Random password generation.
//!
//! Generated passwords always satisfy the master-password strength
//! policy: at least one lowercase, one uppercase, one digit, and one
//! special character from the caller-chosen subset of the allowed set.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::errors::{KeySealError, Result};

/// Special characters a password may contain.
pub const ALLOWED_SPECIAL_CHARS: &str = "-+_&@%$£#!";

/// Minimum length of a generated password.
pub const MIN_GENERATED_LEN: usize = 10;

/// Generate a random password of `length` characters.
///
/// `special` selects which of the allowed special characters may appear;
/// an empty string means the full allowed set. Characters outside
/// `ALLOWED_SPECIAL_CHARS` are rejected.
pub fn generate_password(length: usize, special: &str) -> Result<String> {
    if length < MIN_GENERATED_LEN {
        return Err(KeySealError::WeakPassword(format!(
            "generated passwords must be at least {MIN_GENERATED_LEN} characters"
        )));
    }

    for c in special.chars() {
        if !ALLOWED_SPECIAL_CHARS.contains(c) {
            return Err(KeySealError::InvalidCryptoArgument(format!(
                "'{c}' is not an allowed special character ({ALLOWED_SPECIAL_CHARS})"
            )));
        }
    }

    let specials: Vec<char> = if special.is_empty() {
        ALLOWED_SPECIAL_CHARS.chars().collect()
    } else {
        special.chars().collect()
    };

    let lower: Vec<char> = ('a'..='z').collect();
    let upper: Vec<char> = ('A'..='Z').collect();
    let digits: Vec<char> = ('0'..='9').collect();

    let mut rng = rand::rng();
    let pick = |rng: &mut rand::rngs::ThreadRng, set: &[char]| set[rng.random_range(0..set.len())];

    // One from each required class, then fill from the combined pool.
    let mut chars = vec![
        pick(&mut rng, &lower),
        pick(&mut rng, &upper),
        pick(&mut rng, &digits),
        pick(&mut rng, &specials),
    ];

    let pool: Vec<char> = lower
        .iter()
        .chain(upper.iter())
        .chain(digits.iter())
        .chain(specials.iter())
        .copied()
        .collect();

    while chars.len() < length {
        chars.push(pick(&mut rng, &pool));
    }

    // Shuffle so the class-guaranteed characters are not at fixed positions.
    chars.shuffle(&mut rng);

    Ok(chars.into_iter().collect())
}
