use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::thread_rng;

use crate::error::{AppError, messages};

/// Salted one-way digest of a freshly supplied plaintext. Callers hash
/// exactly once, right before the row is written; stored digests are
/// never re-hashed on unrelated updates.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| {
            tracing::error!(error = %err, "password hashing failed");
            AppError::persistence("password_error", messages::PERSISTENCE)
        })?
        .to_string();
    Ok(hash)
}

/// A digest that does not parse counts as a mismatch, not an error. A
/// corrupt stored hash must fail closed exactly like a wrong password.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn digest_never_equals_plaintext_and_verifies() {
        let digest = hash_password("p").expect("hash should succeed");

        assert_ne!(digest, "p");
        assert!(verify_password("p", &digest));
        assert!(!verify_password("wrong", &digest));
    }

    #[test]
    fn same_plaintext_hashes_to_distinct_digests() {
        let first = hash_password("password123").expect("hash should succeed");
        let second = hash_password("password123").expect("hash should succeed");

        assert_ne!(first, second);
        assert!(verify_password("password123", &first));
        assert!(verify_password("password123", &second));
    }

    #[test]
    fn corrupt_digest_counts_as_mismatch() {
        assert!(!verify_password("password123", "not-a-digest"));
    }
}
