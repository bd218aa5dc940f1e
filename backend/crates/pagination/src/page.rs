//! Page requests and response envelopes.

use serde::Serialize;
use thiserror::Error;

use crate::cursor::{Cursor, CursorError};

/// Page size used when the client does not ask for one.
pub const DEFAULT_LIMIT: u32 = 50;
/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 200;

/// Errors raised when validating a requested page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageLimitError {
    /// Zero rows were requested.
    #[error("page limit must be at least 1")]
    Zero,
    /// More rows than [`MAX_LIMIT`] were requested.
    #[error("page limit must be at most {max}")]
    TooLarge {
        /// The configured maximum.
        max: u32,
    },
}

/// Validated page size in `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(u32);

impl PageLimit {
    /// Validate an optional client-provided limit, defaulting when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PageLimitError`] when the value is zero or above
    /// [`MAX_LIMIT`].
    pub const fn new(limit: Option<u32>) -> Result<Self, PageLimitError> {
        match limit {
            None => Ok(Self(DEFAULT_LIMIT)),
            Some(0) => Err(PageLimitError::Zero),
            Some(value) if value > MAX_LIMIT => Err(PageLimitError::TooLarge { max: MAX_LIMIT }),
            Some(value) => Ok(Self(value)),
        }
    }

    /// Number of rows to return.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Number of rows a repository should fetch to detect a following page.
    pub const fn overfetch(self) -> i64 {
        self.0 as i64 + 1
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

/// A validated request for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<K> {
    limit: PageLimit,
    after: Option<Cursor<K>>,
}

impl<K> PageRequest<K> {
    /// Request the first page.
    pub const fn first(limit: PageLimit) -> Self {
        Self { limit, after: None }
    }

    /// Request the page following `cursor`.
    pub const fn after(limit: PageLimit, cursor: Cursor<K>) -> Self {
        Self {
            limit,
            after: Some(cursor),
        }
    }

    /// Requested page size.
    pub const fn limit(&self) -> PageLimit {
        self.limit
    }

    /// Key of the last row already seen, if any.
    pub fn after_key(&self) -> Option<&K> {
        self.after.as_ref().map(Cursor::key)
    }
}

impl<K: serde::de::DeserializeOwned> PageRequest<K> {
    /// Build a request from raw query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError`] when the cursor token cannot be decoded.
    pub fn from_token(limit: PageLimit, token: Option<&str>) -> Result<Self, CursorError> {
        match token {
            None => Ok(Self::first(limit)),
            Some(raw) if raw.trim().is_empty() => Ok(Self::first(limit)),
            Some(raw) => Ok(Self::after(limit, Cursor::decode(raw)?)),
        }
    }
}

/// One page of results plus the token for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page, in sort order.
    pub items: Vec<T>,
    /// Token to request the following page; absent on the last page.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from `limit + 1` fetched rows.
    ///
    /// When more rows than the limit were fetched the surplus is dropped and
    /// the next cursor is derived from the last row kept.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Serialize`] when the key cannot be encoded.
    pub fn from_overfetch<K, F>(
        mut rows: Vec<T>,
        limit: PageLimit,
        key_of: F,
    ) -> Result<Self, CursorError>
    where
        K: Serialize,
        F: Fn(&T) -> K,
    {
        let limit = usize::try_from(limit.get()).unwrap_or(usize::MAX);
        if rows.len() <= limit {
            return Ok(Self {
                items: rows,
                next_cursor: None,
            });
        }
        rows.truncate(limit);
        let next_cursor = rows
            .last()
            .map(|row| Cursor::new(key_of(row)).encode())
            .transpose()?;
        Ok(Self {
            items: rows,
            next_cursor,
        })
    }

    /// Transform every row while keeping the cursor.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}
