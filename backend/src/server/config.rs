//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use fournil::inbound::http::cron::CronSecret;
use fournil::inbound::http::session_config::SessionSettings;
use fournil::outbound::persistence::DbPool;
use fournil::outbound::sms::SmsProvider;

/// Everything `create_server` needs beyond the health state.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) cron_secret: CronSecret,
    pub(crate) sms: Option<SmsProvider>,
}

impl ServerConfig {
    /// Combine validated session settings with the listener and pool.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, db_pool: DbPool) -> Self {
        Self {
            key: session.key,
            cookie_secure: session.cookie_secure,
            same_site: session.same_site,
            bind_addr,
            db_pool,
            cron_secret: CronSecret::default(),
            sms: None,
        }
    }

    /// Guard the cron endpoint with a bearer secret.
    #[must_use]
    pub fn with_cron_secret(mut self, cron_secret: CronSecret) -> Self {
        self.cron_secret = cron_secret;
        self
    }

    /// Send SMS through a provider instead of logging them.
    #[must_use]
    pub fn with_sms_provider(mut self, provider: Option<SmsProvider>) -> Self {
        self.sms = provider;
        self
    }
}
