//! Cursor encoding and decoding.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while decoding a client-supplied cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The token is not valid URL-safe base64.
    #[error("cursor is not valid base64")]
    Encoding,
    /// The decoded bytes do not describe the expected key.
    #[error("cursor does not describe a valid position")]
    Payload,
    /// The key could not be serialised.
    #[error("cursor key could not be serialised: {message}")]
    Serialize {
        /// Serialiser failure message.
        message: String,
    },
}

/// Position in an ordered result set, keyed by the sort key of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap a sort key.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the wrapped key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consume the cursor, returning the key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the cursor as an opaque token.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Serialize`] when the key cannot be represented
    /// as JSON.
    pub fn encode(&self) -> Result<String, CursorError> {
        let json = serde_json::to_vec(&self.key).map_err(|err| CursorError::Serialize {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode an opaque token produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Encoding`] for malformed base64 and
    /// [`CursorError::Payload`] when the bytes do not describe a key.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CursorError::Encoding)?;
        let key = serde_json::from_slice(&bytes).map_err(|_| CursorError::Payload)?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for cursor encoding.

    use rstest::rstest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Key {
        at: String,
        id: u32,
    }

    #[rstest]
    fn encoded_cursor_decodes_to_same_key() {
        let cursor = Cursor::new(Key {
            at: "2026-03-01T08:00:00Z".to_owned(),
            id: 7,
        });
        let token = cursor.encode().expect("encode");

        let decoded = Cursor::<Key>::decode(&token).expect("decode");
        assert_eq!(decoded, cursor);
        assert!(!token.contains('='), "tokens carry no padding");
    }

    #[rstest]
    #[case("%%%not-base64%%%", CursorError::Encoding)]
    #[case("bm90LWpzb24", CursorError::Payload)]
    fn malformed_tokens_are_rejected(#[case] token: &str, #[case] expected: CursorError) {
        let err = Cursor::<Key>::decode(token).expect_err("token must be rejected");
        assert_eq!(err, expected);
    }
}
