//! Keyset pagination keys shared by the list endpoints.
//!
//! Lists are ordered newest first by a timestamp, with the record id breaking
//! ties, so a cursor only needs those two values.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Error;

/// Position of a row in a newest-first listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListKey {
    /// Sort timestamp.
    pub at: DateTime<Utc>,
    /// Tie-breaker.
    pub id: Uuid,
}

impl ListKey {
    /// Build a key.
    #[must_use]
    pub const fn new(at: DateTime<Utc>, id: Uuid) -> Self {
        Self { at, id }
    }
}

/// Key for lists ordered by a calendar date; the date sorts as midnight UTC.
#[must_use]
pub fn day_key(date: NaiveDate, id: Uuid) -> ListKey {
    ListKey::new(date.and_time(NaiveTime::MIN).and_utc(), id)
}

/// Page request keyed by [`ListKey`].
pub type ListRequest = PageRequest<ListKey>;

/// Page of results keyed by [`ListKey`].
pub type ListPage<T> = Page<T>;

/// Trim an over-fetched result set into a page, deriving the next cursor
/// from the last row kept.
pub(crate) fn paginate<T>(
    rows: Vec<T>,
    request: &ListRequest,
    key_of: impl Fn(&T) -> ListKey,
) -> Result<ListPage<T>, Error> {
    Page::from_overfetch(rows, request.limit(), key_of)
        .map_err(|err| Error::internal(format!("failed to encode cursor: {err}")))
}
