//! Helpers shared by the repository integration suites.
//!
//! Every file under `tests/` compiles as its own crate and pulls this module
//! in with `mod support;`, so each suite uses only some of these helpers.
#![allow(dead_code, reason = "each integration suite uses a subset of the helpers")]

pub mod cluster;
pub mod embedded_postgres;
pub mod seed;

pub use cluster::{handle_cluster_setup_failure, shared_cluster};
pub use embedded_postgres::TestDatabase;

/// Render a `postgres` error with its SQLSTATE and detail.
///
/// The plain `Display` output collapses server errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }
    summary
}
