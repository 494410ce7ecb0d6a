//! Credential hashing
//!
//! Argon2id with PHC string encoding. Each call draws a fresh 16-byte
//! salt, so hashing the same password twice yields different strings.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::error::{Error, Result};

/// A syntactically valid PHC string for a throwaway password.
///
/// Verified against when a login identifier resolves to no holder, so
/// the unknown-identifier path performs the same hashing work as the
/// wrong-password path. Always followed by an unconditional rejection.
pub const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$VE0e3g7DalWHgDwou3nuRA$uC6TER156UQpk0lNQ5+jHM0l5poVjPA1he8TZebqrig";

/// Hash a plaintext password into a PHC string.
pub fn hash(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| Error::PasswordHash {
        message: e.to_string(),
    })?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| Error::PasswordHash {
        message: e.to_string(),
    })?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })?
        .to_string();
    Ok(phc)
}

/// True iff `password` matches the PHC string `hash`.
///
/// Unparseable hashes verify as false rather than erroring.
pub fn verify(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let phc = hash("secret").unwrap();
        assert!(verify("secret", &phc));
        assert!(!verify("not-secret", &phc));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let a = hash("secret").unwrap();
        let b = hash("secret").unwrap();
        assert_ne!(a, b);
        assert!(verify("secret", &a));
        assert!(verify("secret", &b));
    }

    #[test]
    fn test_garbage_hash_verifies_false() {
        assert!(!verify("secret", "not-a-phc-string"));
        assert!(!verify("secret", ""));
    }

    #[test]
    fn test_dummy_hash_is_parseable() {
        assert!(PasswordHash::new(DUMMY_HASH).is_ok());
        assert!(!verify("anything", DUMMY_HASH));
    }
}
