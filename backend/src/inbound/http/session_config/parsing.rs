//! Lenient-in-debug parsing of session toggles.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError};

const FLAG_EXPECTED: &str = "true|false|1|0|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Debug builds take `fallback` and warn; release builds fail with `error`.
fn fallback_or<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(%error, "session setting ignored in debug build");
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub(super) fn flag_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        return fallback_or(mode, default, SessionConfigError::MissingEnv { name });
    };
    match parse_flag(&value) {
        Some(flag) => Ok(flag),
        None => fallback_or(
            mode,
            default,
            SessionConfigError::InvalidEnv {
                name,
                value,
                expected: FLAG_EXPECTED,
            },
        ),
    }
}

pub(super) fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = env.string(SAMESITE_ENV) else {
        return fallback_or(
            mode,
            SameSite::Lax,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
        );
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => fallback_or(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => fallback_or(
            mode,
            SameSite::Lax,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::parse_flag;

    #[rstest]
    #[case("1", Some(true))]
    #[case(" Yes ", Some(true))]
    #[case("false", Some(false))]
    #[case("n", Some(false))]
    #[case("maybe", None)]
    fn flags(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_flag(raw), expected);
    }
}
