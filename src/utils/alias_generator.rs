//! Random alias and identifier generation.

use rand::Rng;

/// Number of characters in a generated alias.
pub const ALIAS_LENGTH: usize = 8;

/// ASCII letters, upper case first.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generates a random alias of [`ALIAS_LENGTH`] letters.
///
/// Collisions are possible (52^8 space); callers check the backend before use.
///
/// # Examples
///
/// ```ignore
/// let alias = generate_alias();
/// assert_eq!(alias.len(), 8);
/// assert!(alias.chars().all(|c| c.is_ascii_alphabetic()));
/// ```
pub fn generate_alias() -> String {
    random_string(ALIAS_LENGTH)
}

/// Generates a random string of `len` characters drawn from the alias alphabet.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generates an opaque external user identifier (32 hex characters).
pub fn generate_user_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}
