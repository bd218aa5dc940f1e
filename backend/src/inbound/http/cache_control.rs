//! `Cache-Control` policy for figures that change with every write.

/// Balances, stock summaries, and reports are per-user and always stale.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Header pair for [`actix_web::HttpResponseBuilder::insert_header`].
pub const fn private_no_cache_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
