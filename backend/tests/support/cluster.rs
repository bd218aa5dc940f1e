//! The process-wide embedded PostgreSQL cluster and the skip policy for
//! hosts that cannot start one.
//!
//! Set `SKIP_TEST_CLUSTER=1` to turn cluster start-up failures into skips;
//! without it a failure panics so CI breakage is never masked.

use std::fmt::Display;
use std::time::Duration;

use env_lock::lock_env;
use pg_embedded_setup_unpriv::ClusterHandle;

const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Password used when `PG_PASSWORD` is unset.
///
/// The cluster keeps the password it was initialised with, and the data
/// directory outlives the test binary, so every run must present the same one.
const EMBEDDED_PASSWORD: &str = "fournil_embedded_test";

/// True when `SKIP_TEST_CLUSTER` is "1", "true" or "yes" in any case.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip (returning `None`) or panic, depending on `SKIP_TEST_CLUSTER`.
pub fn handle_cluster_setup_failure<T>(reason: impl Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Start the shared cluster on first use, retrying transient failures.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let _password = std::env::var_os("PG_PASSWORD")
        .is_none()
        .then(|| lock_env([("PG_PASSWORD", Some(EMBEDDED_PASSWORD.to_owned()))]));

    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= CLUSTER_RETRIES => {
                return Err(format!("start embedded cluster: {error:?}"));
            }
            Err(_) => {
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}
