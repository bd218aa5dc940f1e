//! Opaque keyset cursors and page envelopes.
//!
//! Ledger endpoints (stock movements, sales, expenses, bank transactions)
//! grow without bound, so they page with keyset cursors rather than offsets.
//! A cursor wraps the sort key of the last row a client has seen; it is
//! serialised as JSON and encoded as URL-safe base64 so clients treat it as
//! an opaque token.
//!
//! Repositories fetch `limit + 1` rows and hand them to
//! [`Page::from_overfetch`], which trims the surplus row and derives the next
//! cursor from the last row kept.

mod cursor;
mod page;

pub use cursor::{Cursor, CursorError};
pub use page::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageLimit, PageLimitError, PageRequest};
