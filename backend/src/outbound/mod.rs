//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel.
//! - **sms**: HTTP provider and log-only SMS gateways.
//! - **password**: Argon2id password hashing.
//!
//! Adapters translate between domain types and their infrastructure; they
//! hold no business rules.

pub mod password;
pub mod persistence;
pub mod sms;
