//! Authentication primitives: password hashing and session tokens
//!
//! Passwords are stored as salted SHA-256 digests: a random 16-byte salt is
//! generated per account, and the stored hash is `sha256(salt_hex || password)`
//! rendered as 64 hex characters. Session tokens are random UUID v4 strings.
//!
//! This module contains only pure functions - HTTP and database glue lives in
//! the service crate.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a random per-account salt (16 bytes, 32 hex characters)
pub fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt
///
/// Returns 64 hex characters (SHA-256 of `salt || password`).
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password attempt against the stored salt and hash
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(password, salt) == stored_hash
}

/// Generate a fresh session token
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_is_32_hex_characters() {
        let salt = generate_salt();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn salts_are_unique() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn hash_is_deterministic_for_same_inputs() {
        let salt = generate_salt();
        assert_eq!(
            hash_password("secret", &salt),
            hash_password("secret", &salt)
        );
    }

    #[test]
    fn different_salts_produce_different_hashes() {
        let a = hash_password("secret", "00112233445566778899aabbccddeeff");
        let b = hash_password("secret", "ffeeddccbbaa99887766554433221100");
        assert_ne!(a, b);
    }

    #[test]
    fn verify_accepts_correct_password() {
        let salt = generate_salt();
        let hash = hash_password("secret", &salt);
        assert!(verify_password("secret", &salt, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let salt = generate_salt();
        let hash = hash_password("secret", &salt);
        assert!(!verify_password("wrong", &salt, &hash));
    }

    #[test]
    fn session_tokens_are_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }
}
