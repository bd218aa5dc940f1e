//! Port for one-way password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing or parsing a stored hash failed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes passwords for storage and verifies login attempts.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash suitable for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a stored hash.
    ///
    /// Returns `Ok(false)` for a wrong password and `Err` only when the
    /// stored hash cannot be parsed.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError>;
}
