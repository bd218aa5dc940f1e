//! Externally scheduled jobs.
//!
//! ```text
//! POST /api/v1/cron/daily-notifications   Authorization: Bearer <secret>
//! ```

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, post, web};
use sha2::{Digest, Sha256};

use crate::domain::{DigestRunReport, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Shared secret guarding the cron endpoints.
///
/// Only the SHA-256 digest of the secret is kept in memory; presented tokens
/// are hashed and the digests compared.
#[derive(Clone, Default)]
pub struct CronSecret {
    digest: Option<[u8; 32]>,
}

impl CronSecret {
    /// Configure the secret. Blank or absent secrets disable the endpoints.
    pub fn new(secret: Option<&str>) -> Self {
        let digest = secret
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .map(|secret| Sha256::digest(secret.as_bytes()).into());
        Self { digest }
    }

    /// Whether a secret is configured.
    pub const fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    /// Check an `Authorization` header against the secret.
    ///
    /// # Errors
    ///
    /// `service_unavailable` when no secret is configured, `unauthorized`
    /// when the header is missing, malformed, or carries the wrong token.
    pub fn verify(&self, authorization: Option<&HeaderValue>) -> Result<(), Error> {
        let expected = self
            .digest
            .ok_or_else(|| Error::service_unavailable("cron secret is not configured"))?;
        let token = authorization
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
        let presented: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        if presented == expected {
            Ok(())
        } else {
            Err(Error::unauthorized("invalid bearer token"))
        }
    }
}

/// Send the daily digest SMS to every restaurant that asked for one.
#[utoipa::path(
    post,
    path = "/api/v1/cron/daily-notifications",
    responses(
        (status = 200, description = "Digest run summary", body = DigestRunReport),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 503, description = "Cron secret not configured", body = ErrorSchema)
    ),
    tags = ["cron"],
    operation_id = "runDailyNotifications",
    security(("CronBearer" = []))
)]
#[post("/cron/daily-notifications")]
pub async fn daily_notifications(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<web::Json<DigestRunReport>> {
    state
        .cron_secret
        .verify(request.headers().get(header::AUTHORIZATION))?;
    let report = state.notifications.run_daily_digest().await?;
    Ok(web::Json(report))
}

/// Register the cron routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(daily_notifications);
}
