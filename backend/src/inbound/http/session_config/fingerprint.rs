//! Loggable fingerprint of the session key.
//!
//! Operators compare fingerprints across replicas to confirm they share a
//! key; the key itself never reaches the logs.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First eight bytes of the SHA-256 of the signing key, as lowercase hex.
///
/// # Examples
///
/// ```
/// use actix_web::cookie::Key;
/// use fournil::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let key = Key::derive_from(&[7_u8; 64]);
/// assert_eq!(key_fingerprint(&key), key_fingerprint(&key));
/// assert_eq!(key_fingerprint(&key).len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
