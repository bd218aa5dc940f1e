//! Correlation id for one request, readable from anywhere on its task.
//!
//! Error envelopes and log lines both carry it. Spawned tasks do not inherit
//! task-locals, so work moved onto another task must re-enter
//! [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// UUID naming a single request.
///
/// # Examples
/// ```
/// use fournil::TraceId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let id: TraceId = "7d0c9e52-41a3-4f0e-9d57-2b1a6f3c8e44".parse().expect("uuid");
/// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `work` with `id` as the current trace id.
    pub async fn scope<F: Future>(id: Self, work: F) -> F::Output {
        CURRENT.scope(id, work).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}
