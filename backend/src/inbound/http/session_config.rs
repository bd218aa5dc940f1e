//! Cookie-session settings read from the environment.
//!
//! | Variable                          | Debug default        | Release          |
//! |-----------------------------------|----------------------|------------------|
//! | `FOURNIL_SESSION_KEY_FILE`        | `/run/secrets/fournil_session_key` | same |
//! | `FOURNIL_SESSION_COOKIE_SECURE`   | `true` (warns)       | required         |
//! | `FOURNIL_SESSION_SAMESITE`        | `Lax` (warns)        | required         |
//! | `FOURNIL_SESSION_ALLOW_EPHEMERAL` | `false` (warns)      | must be `false`  |
//!
//! Debug builds fall back to a generated key when the key file is missing;
//! release builds refuse to start without a key of at least 64 bytes.

pub mod fingerprint;
mod parsing;

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::{info, warn};
use zeroize::Zeroizing;

use self::fingerprint::key_fingerprint;
use self::parsing::{flag_from_env, same_site_from_env};

pub(crate) const KEY_FILE_ENV: &str = "FOURNIL_SESSION_KEY_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "FOURNIL_SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "FOURNIL_SESSION_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "FOURNIL_SESSION_ALLOW_EPHEMERAL";

const DEFAULT_KEY_PATH: &str = "/run/secrets/fournil_session_key";
const MIN_KEY_LEN: usize = 64;

/// Session lifetime; cookies are refreshed on every authenticated request.
pub const SESSION_TTL_HOURS: i64 = 2;

/// Whether configuration mistakes are tolerated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Fall back to defaults with a warning.
    Debug,
    /// Reject missing or invalid settings.
    Release,
}

impl BuildMode {
    /// Pick the mode matching `cfg!(debug_assertions)`.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        self == Self::Debug
    }
}

/// Validated cookie-session settings.
pub struct SessionSettings {
    /// Signing and encryption key.
    pub key: Key,
    /// Mark cookies `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
    /// Short fingerprint of `key`, safe to log.
    pub fingerprint: String,
}

/// Raised when session settings cannot be used.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required variable is unset.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable holds an unusable value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than 64 bytes.
    #[error("session key at {path} is {length} bytes; at least 64 are required")]
    KeyTooShort { path: PathBuf, length: usize },
    /// `SameSite=None` without `Secure`.
    #[error("FOURNIL_SESSION_SAMESITE=None requires FOURNIL_SESSION_COOKIE_SECURE=true")]
    InsecureSameSiteNone,
    /// Ephemeral keys were requested in a release build.
    #[error("FOURNIL_SESSION_ALLOW_EPHEMERAL must be false in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate the session settings.
///
/// # Examples
///
/// ```
/// use fournil::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "FOURNIL_SESSION_KEY_FILE" => Some("/nonexistent/fournil-key".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = flag_from_env(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = flag_from_env(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = load_key(env, mode, allow_ephemeral)?;
    let fingerprint = key_fingerprint(&key);
    info!(fingerprint = %fingerprint, "session key loaded");
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        fingerprint,
    })
}

fn load_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            if !mode.is_debug() && bytes.len() < MIN_KEY_LEN {
                return Err(SessionConfigError::KeyTooShort {
                    length: bytes.len(),
                    path,
                });
            }
            Ok(Key::derive_from(&bytes))
        }
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using an ephemeral session key");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

#[cfg(test)]
mod tests;
