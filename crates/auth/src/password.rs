//! Salted password hashing.

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::Rng;
use sha2::Sha512;
use subtle::ConstantTimeEq;

use crate::{AuthError, AuthResult};

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 1000;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 64;

/// A derived password hash and the salt it was derived with, both base64.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    pub hash: String,
    pub salt: String,
}

impl std::fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredential").finish_non_exhaustive()
    }
}

impl PasswordCredential {
    /// Derives a credential from `password` with a fresh random salt.
    pub fn derive(password: &str) -> Self {
        let mut rng = rand::rng();
        let salt: Vec<u8> = (0..SALT_LEN).map(|_| rng.random::<u8>()).collect();
        let hash = derive_key(password, &salt);

        Self {
            hash: STANDARD.encode(hash),
            salt: STANDARD.encode(&salt),
        }
    }

    /// Checks `password` against a stored hash and salt.
    pub fn verify(password: &str, hash: &str, salt: &str) -> AuthResult<bool> {
        let salt = STANDARD
            .decode(salt)
            .map_err(|e| AuthError::CorruptCredential(format!("salt: {e}")))?;
        let expected = STANDARD
            .decode(hash)
            .map_err(|e| AuthError::CorruptCredential(format!("hash: {e}")))?;

        let actual = derive_key(password, &salt);

        Ok(actual.as_slice().ct_eq(&expected).into())
    }
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_and_verify() {
        let credential = PasswordCredential::derive("hunter2");

        assert!(PasswordCredential::verify("hunter2", &credential.hash, &credential.salt).unwrap());
        assert!(!PasswordCredential::verify("hunter3", &credential.hash, &credential.salt).unwrap());
    }

    #[test]
    fn test_hash_never_contains_password() {
        let credential = PasswordCredential::derive("plaintext-password");
        assert!(!credential.hash.contains("plaintext-password"));
        assert_ne!(credential.hash, credential.salt);
    }

    #[test]
    fn test_salts_differ() {
        let a = PasswordCredential::derive("same");
        let b = PasswordCredential::derive("same");

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_corrupt_credential() {
        let result = PasswordCredential::verify("x", "not base64!", "also not");
        assert!(matches!(result, Err(AuthError::CorruptCredential(_))));
    }

    #[test]
    fn test_truncated_hash_does_not_match() {
        let credential = PasswordCredential::derive("hunter2");
        let truncated = STANDARD.encode(&STANDARD.decode(&credential.hash).unwrap()[..32]);

        assert!(!PasswordCredential::verify("hunter2", &truncated, &credential.salt).unwrap());
    }
}
