//! Port for outbound SMS delivery.

use async_trait::async_trait;

use crate::domain::PhoneNumber;

use super::define_port_error;

define_port_error! {
    /// Errors raised by SMS gateway adapters.
    pub enum SmsGatewayError {
        /// The provider could not be reached.
        Transport { message: String } => "sms provider unreachable: {message}",
        /// The provider refused the message.
        Rejected { status: u16, message: String } => "sms provider rejected message ({status}): {message}",
    }
}

/// Sends text messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver `body` to `to`.
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<(), SmsGatewayError>;
}
