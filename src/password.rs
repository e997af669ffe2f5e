//! Salted PBKDF2-HMAC-SHA256 password hashes.
//!
//! Hashes are stored as `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`, so
//! the iteration count can be raised later without invalidating existing
//! accounts. Hashes written by Werkzeug's `generate_password_hash` use the
//! same layout and verify here.

use pbkdf2::pbkdf2_hmac;
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

const METHOD_PREFIX: &str = "pbkdf2:sha256:";
const SALT_LENGTH: usize = 16;
const DIGEST_LENGTH: usize = 32;

/// Iteration count used for new hashes unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("unsupported hash method: {0}")]
    UnsupportedMethod(String),
    #[error("malformed password hash")]
    Malformed,
}

/// Produces new password hashes with a fixed iteration count.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let salt: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LENGTH)
            .map(char::from)
            .collect();
        let digest = derive(password, &salt, self.iterations);
        format!(
            "{}{}${}${}",
            METHOD_PREFIX,
            self.iterations,
            salt,
            hex::encode(digest)
        )
    }
}

struct StoredHash<'a> {
    iterations: u32,
    salt: &'a str,
    digest: Vec<u8>,
}

fn parse(stored: &str) -> Result<StoredHash<'_>, PasswordError> {
    let mut parts = stored.splitn(3, '$');
    let (Some(method), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(PasswordError::Malformed);
    };

    let iterations = method
        .strip_prefix(METHOD_PREFIX)
        .ok_or_else(|| PasswordError::UnsupportedMethod(method.to_string()))?
        .parse::<u32>()
        .map_err(|_| PasswordError::Malformed)?;
    if iterations == 0 || salt.is_empty() {
        return Err(PasswordError::Malformed);
    }

    let digest = hex::decode(digest).map_err(|_| PasswordError::Malformed)?;
    Ok(StoredHash {
        iterations,
        salt,
        digest,
    })
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; DIGEST_LENGTH] {
    let mut digest = [0u8; DIGEST_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut digest);
    digest
}

/// Checks `password` against a stored hash. Malformed hashes never match.
pub fn verify(stored: &str, password: &str) -> bool {
    let parsed = match parse(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Refusing to verify against stored hash: {}", e);
            return false;
        }
    };

    let computed = derive(password, parsed.salt, parsed.iterations);
    computed.as_slice().ct_eq(parsed.digest.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new(1_000);
        let stored = hasher.hash("correct horse");

        assert!(stored.starts_with("pbkdf2:sha256:1000$"));
        assert!(verify(&stored, "correct horse"));
        assert!(!verify(&stored, "correct horse "));
        assert!(!verify(&stored, ""));
    }

    #[test]
    fn test_salt_differs_between_hashes() {
        let hasher = PasswordHasher::new(1_000);
        assert_ne!(hasher.hash("same"), hasher.hash("same"));
    }

    #[test]
    fn test_known_vector() {
        // Published PBKDF2-HMAC-SHA256 vector: "password", "salt", 1 iteration
        let stored =
            "pbkdf2:sha256:1$salt$120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b";
        assert!(verify(stored, "password"));
        assert!(!verify(stored, "Password"));
    }

    #[test]
    fn test_malformed_hashes() {
        assert_eq!(parse("").err(), Some(PasswordError::Malformed));
        assert_eq!(
            parse("scrypt:32768:8:1$salt$abcd").err(),
            Some(PasswordError::UnsupportedMethod("scrypt:32768:8:1".to_string()))
        );
        assert_eq!(parse("pbkdf2:sha256:0$salt$abcd").err(), Some(PasswordError::Malformed));
        assert_eq!(parse("pbkdf2:sha256:10$salt$zz").err(), Some(PasswordError::Malformed));
        assert!(!verify("pbkdf2:sha256:10$salt", "anything"));
    }
}
