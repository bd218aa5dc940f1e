//! Process settings loaded via OrthoConfig.
//!
//! Every field can come from a `FOURNIL_*` environment variable, a
//! configuration file, or a command-line flag. Only the database URL is
//! mandatory; the rest fall back to the defaults below.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use url::Url;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::outbound::sms::SmsProvider;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_SENDER_ID: &str = "Fournil";

/// Raised when settings are present but unusable.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    /// `FOURNIL_DATABASE_URL` is unset or blank.
    #[error("FOURNIL_DATABASE_URL is required")]
    MissingDatabaseUrl,
    /// The bind host is not an IP address.
    #[error("invalid bind host '{0}'")]
    InvalidBindHost(String),
    /// The SMS endpoint is not a URL.
    #[error("invalid SMS endpoint '{value}': {message}")]
    InvalidSmsEndpoint { value: String, message: String },
    /// An SMS endpoint was given without an API key.
    #[error("FOURNIL_SMS_API_KEY is required when FOURNIL_SMS_ENDPOINT is set")]
    MissingSmsApiKey,
}

/// Settings shared by the server and the admin tool.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOURNIL")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Address to listen on; defaults to all interfaces.
    pub bind_host: Option<String>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// Upper bound on pooled database connections.
    pub pool_size: Option<u32>,
    /// Bearer secret for the cron endpoint; unset disables it.
    pub cron_secret: Option<String>,
    /// SMS provider submission URL; unset logs messages instead.
    pub sms_endpoint: Option<String>,
    /// SMS provider API key.
    pub sms_api_key: Option<String>,
    /// Sender id shown on outgoing SMS.
    pub sms_sender_id: Option<String>,
    /// Run pending migrations at startup.
    #[ortho_config(default = true)]
    pub migrate: bool,
}

impl AppSettings {
    /// The database URL, which must be set.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Socket address for the HTTP listener.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = match self.bind_host.as_deref().map(str::trim) {
            None | Some("") => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(host) => host
                .parse()
                .map_err(|_| SettingsError::InvalidBindHost(host.to_owned()))?,
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Pool size, never zero.
    pub fn pool_size(&self) -> u32 {
        self.pool_size.filter(|size| *size > 0).unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Provider settings when an endpoint is configured.
    ///
    /// `Ok(None)` means messages are only logged.
    pub fn sms_provider(&self) -> Result<Option<SmsProvider>, SettingsError> {
        let Some(raw) = self
            .sms_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        else {
            return Ok(None);
        };
        let endpoint = Url::parse(raw).map_err(|err| SettingsError::InvalidSmsEndpoint {
            value: raw.to_owned(),
            message: err.to_string(),
        })?;
        let api_key = self
            .sms_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(SettingsError::MissingSmsApiKey)?;
        Ok(Some(SmsProvider {
            endpoint,
            api_key: Zeroizing::new(api_key.to_owned()),
            sender_id: self
                .sms_sender_id
                .clone()
                .unwrap_or_else(|| DEFAULT_SENDER_ID.to_owned()),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Environment-driven loading.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 9] = [
        "FOURNIL_DATABASE_URL",
        "FOURNIL_BIND_HOST",
        "FOURNIL_PORT",
        "FOURNIL_POOL_SIZE",
        "FOURNIL_CRON_SECRET",
        "FOURNIL_SMS_ENDPOINT",
        "FOURNIL_SMS_API_KEY",
        "FOURNIL_SMS_SENDER_ID",
        "FOURNIL_MIGRATE",
    ];

    fn load_with(overrides: &[(&'static str, &str)]) -> AppSettings {
        let vars = VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        AppSettings::load_from_iter([OsString::from("fournil")]).expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);

        assert_eq!(settings.database_url(), Err(SettingsError::MissingDatabaseUrl));
        assert_eq!(
            settings.bind_addr().expect("default bind"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.pool_size(), DEFAULT_POOL_SIZE);
        assert!(settings.migrate);
        assert!(settings.sms_provider().expect("no provider").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("FOURNIL_DATABASE_URL", "postgres://fournil@localhost/fournil"),
            ("FOURNIL_BIND_HOST", "127.0.0.1"),
            ("FOURNIL_PORT", "9090"),
            ("FOURNIL_POOL_SIZE", "4"),
            ("FOURNIL_SMS_ENDPOINT", "https://sms.example.gn/v1/messages"),
            ("FOURNIL_SMS_API_KEY", "sk-test"),
            ("FOURNIL_SMS_SENDER_ID", "Boulangerie"),
        ]);

        assert_eq!(
            settings.database_url(),
            Ok("postgres://fournil@localhost/fournil")
        );
        assert_eq!(
            settings.bind_addr().expect("bind"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.pool_size(), 4);
        let provider = settings.sms_provider().expect("valid").expect("configured");
        assert_eq!(provider.sender_id, "Boulangerie");
        assert_eq!(provider.api_key.as_str(), "sk-test");
    }

    #[rstest]
    fn bind_host_must_be_an_ip() {
        let settings = load_with(&[("FOURNIL_BIND_HOST", "localhost")]);
        assert_eq!(
            settings.bind_addr(),
            Err(SettingsError::InvalidBindHost("localhost".to_owned()))
        );
    }

    #[rstest]
    fn sms_endpoint_needs_an_api_key() {
        let settings = load_with(&[("FOURNIL_SMS_ENDPOINT", "https://sms.example.gn/send")]);
        assert!(matches!(
            settings.sms_provider(),
            Err(SettingsError::MissingSmsApiKey)
        ));
    }

    #[rstest]
    fn zero_pool_size_falls_back() {
        let settings = load_with(&[("FOURNIL_POOL_SIZE", "0")]);
        assert_eq!(settings.pool_size(), DEFAULT_POOL_SIZE);
    }
}
