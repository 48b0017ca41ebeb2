//! PBKDF2-HMAC-SHA256 password hashing in PHC string form.
//!
//! Stored form: `$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`. The round
//! count travels with the hash, so raising it in configuration does not
//! invalidate existing accounts.

use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::Rng;

use diktat_core::error::{DiktatError, Result};

const OUTPUT_LENGTH: usize = 32;

/// Hash `password` with a fresh random 16-byte salt.
pub fn hash_password(password: &str, rounds: u32) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| DiktatError::Storage(format!("Failed to encode salt: {}", e)))?;
    let params = Params {
        rounds: rounds.max(1),
        output_length: OUTPUT_LENGTH,
    };
    let hash = Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map_err(|e| DiktatError::Storage(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("geheim123", 1000).unwrap();
        assert!(stored.starts_with("$pbkdf2-sha256$i=1000,l=32$"));
        assert!(verify_password("geheim123", &stored));
        assert!(!verify_password("geheim124", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("gleich", 1000).unwrap();
        let b = hash_password("gleich", 1000).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("gleich", &a));
        assert!(verify_password("gleich", &b));
    }

    #[test]
    fn test_zero_rounds_is_raised_to_one() {
        let stored = hash_password("pw", 0).unwrap();
        assert!(stored.starts_with("$pbkdf2-sha256$i=1,"));
        assert!(verify_password("pw", &stored));
    }

    #[test]
    fn test_malformed_hashes_never_verify() {
        for stored in [
            "",
            "plaintext",
            "$md5$abc$def",
            "$pbkdf2-sha256$i=abc,l=32$c2FsdA$aGFzaA",
            "$argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHQ$aGFzaGhhc2g",
            "sha3-256$10$00$00",
        ] {
            assert!(!verify_password("pw", stored), "{:?} verified", stored);
        }
    }
}
