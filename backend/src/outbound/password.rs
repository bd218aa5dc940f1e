//! Argon2id implementation of the `PasswordHasher` port.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id with the crate's default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|err| PasswordHashError::hash(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for hashing and verification.
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::default()
    }

    #[rstest]
    fn hashes_verify_against_the_original(hasher: Argon2PasswordHasher) {
        let stored = hasher.hash("pain-au-chocolat").expect("hash");
        assert!(stored.starts_with("$argon2id$"));
        assert_eq!(hasher.verify("pain-au-chocolat", &stored), Ok(true));
        assert_eq!(hasher.verify("croissant", &stored), Ok(false));
    }

    #[rstest]
    fn hashes_are_salted(hasher: Argon2PasswordHasher) {
        let first = hasher.hash("baguette").expect("hash");
        let second = hasher.hash("baguette").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hashes_are_errors(hasher: Argon2PasswordHasher) {
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }
}
