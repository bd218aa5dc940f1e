//! SMS gateway adapters.
//!
//! [`HttpSmsGateway`] posts to the configured provider; [`LogSmsGateway`]
//! only records the message and is used when no provider is configured.

mod http_gateway;
mod log_gateway;

pub use http_gateway::{HttpSmsGateway, SmsProvider};
pub use log_gateway::LogSmsGateway;
