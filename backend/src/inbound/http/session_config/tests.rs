//! Session settings across build modes.

use std::collections::HashMap;
use std::io::Write as _;

use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

fn env_with(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .returning(move |name| vars.get(name).cloned());
    env
}

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

#[fixture]
fn release_vars() -> HashMap<&'static str, String> {
    HashMap::from([
        (COOKIE_SECURE_ENV, "true".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "false".to_owned()),
    ])
}

#[rstest]
fn release_accepts_a_complete_configuration(mut release_vars: HashMap<&'static str, String>) {
    let key = key_file(64);
    release_vars.insert(KEY_FILE_ENV, key.path().display().to_string());

    let settings = session_settings_from_env(&env_with(release_vars), BuildMode::Release)
        .expect("valid settings");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.fingerprint.len(), 16);
}

#[rstest]
#[case::secure_flag(COOKIE_SECURE_ENV)]
#[case::same_site(SAMESITE_ENV)]
#[case::ephemeral(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(
    mut release_vars: HashMap<&'static str, String>,
    #[case] missing: &'static str,
) {
    release_vars.remove(missing);

    let err = session_settings_from_env(&env_with(release_vars), BuildMode::Release)
        .err()
        .expect("missing toggle");

    assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
fn release_rejects_short_keys(mut release_vars: HashMap<&'static str, String>) {
    let key = key_file(16);
    release_vars.insert(KEY_FILE_ENV, key.path().display().to_string());

    let err = session_settings_from_env(&env_with(release_vars), BuildMode::Release)
        .err()
        .expect("short key");

    assert!(matches!(err, SessionConfigError::KeyTooShort { length: 16, .. }));
}

#[rstest]
fn release_rejects_ephemeral_keys(mut release_vars: HashMap<&'static str, String>) {
    release_vars.insert(ALLOW_EPHEMERAL_ENV, "1".to_owned());

    let err = session_settings_from_env(&env_with(release_vars), BuildMode::Release)
        .err()
        .expect("ephemeral");

    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_same_site_none_without_secure(mut release_vars: HashMap<&'static str, String>) {
    release_vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    release_vars.insert(SAMESITE_ENV, "None".to_owned());

    let err = session_settings_from_env(&env_with(release_vars), BuildMode::Release)
        .err()
        .expect("insecure none");

    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn debug_falls_back_to_defaults_and_an_ephemeral_key() {
    let vars = HashMap::from([
        (KEY_FILE_ENV, "/nonexistent/fournil-session-key".to_owned()),
        (SAMESITE_ENV, "sideways".to_owned()),
    ]);

    let settings =
        session_settings_from_env(&env_with(vars), BuildMode::Debug).expect("debug settings");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn same_key_file_gives_same_fingerprint(mut release_vars: HashMap<&'static str, String>) {
    let key = key_file(64);
    release_vars.insert(KEY_FILE_ENV, key.path().display().to_string());

    let first = session_settings_from_env(&env_with(release_vars.clone()), BuildMode::Release)
        .expect("first load");
    let second = session_settings_from_env(&env_with(release_vars), BuildMode::Release)
        .expect("second load");

    assert_eq!(first.fingerprint, second.fingerprint);
}
