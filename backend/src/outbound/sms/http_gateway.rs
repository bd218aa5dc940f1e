//! Reqwest-backed SMS provider adapter.
//!
//! The provider takes a form POST of `to`, `from`, and `body` authorised
//! with a bearer API key. Any non-2xx status counts as a rejection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use crate::domain::PhoneNumber;
use crate::domain::ports::{SmsGateway, SmsGatewayError};

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Provider endpoint and credentials.
pub struct SmsProvider {
    /// Message submission URL.
    pub endpoint: Url,
    /// Bearer API key.
    pub api_key: Zeroizing<String>,
    /// Sender id shown to recipients.
    pub sender_id: String,
}

/// Sends messages through an HTTP SMS provider.
pub struct HttpSmsGateway {
    client: Client,
    provider: SmsProvider,
}

impl HttpSmsGateway {
    /// Build the adapter with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(provider: SmsProvider, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, provider })
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<(), SmsGatewayError> {
        let response = self
            .client
            .post(self.provider.endpoint.clone())
            .bearer_auth(self.provider.api_key.as_str())
            .form(&[
                ("to", to.as_str()),
                ("from", self.provider.sender_id.as_str()),
                ("body", body),
            ])
            .send()
            .await
            .map_err(|err| SmsGatewayError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &text))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> SmsGatewayError {
    let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        preview.push_str("...");
    }
    if preview.is_empty() {
        preview = status.canonical_reason().unwrap_or("no response body").to_owned();
    }
    SmsGatewayError::rejected(status.as_u16(), preview)
}
