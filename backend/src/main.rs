//! Backend entry-point: loads settings, migrates the database, and serves
//! the REST API with its OpenAPI docs.

mod server;

use std::time::Duration;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use fournil::inbound::http::cron::CronSecret;
use fournil::inbound::http::health::HealthState;
use fournil::inbound::http::session_config::{BuildMode, session_settings_from_env};
use fournil::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use fournil::settings::AppSettings;

use server::{ServerConfig, create_server};

const POOL_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let database_url = settings.database_url().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let sms_provider = settings.sms_provider().map_err(std::io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(std::io::Error::other)?;

    if settings.migrate {
        let applied = run_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
        info!(applied, "database migrations complete");
    }

    let pool = DbPool::new(
        PoolConfig::new(database_url)
            .with_max_size(settings.pool_size())
            .with_checkout_timeout(POOL_CHECKOUT_TIMEOUT),
    )
    .await
    .map_err(std::io::Error::other)?;

    let config = ServerConfig::new(session, bind_addr, pool)
        .with_cron_secret(CronSecret::new(settings.cron_secret.as_deref()))
        .with_sms_provider(sms_provider);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}
