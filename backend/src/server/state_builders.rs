//! Builders wiring outbound adapters into the HTTP state.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use fournil::domain::ports::SmsGateway;
use fournil::inbound::http::state::{HttpState, HttpStatePorts};
use fournil::outbound::password::Argon2PasswordHasher;
use fournil::outbound::persistence::{
    DbPool, DieselBankRepository, DieselDebtRepository, DieselExpenseRepository,
    DieselInventoryRepository, DieselReferenceRepository, DieselReportRepository,
    DieselRestaurantRepository, DieselSaleRepository, DieselUserRepository,
};
use fournil::outbound::sms::{HttpSmsGateway, LogSmsGateway, SmsProvider};

use super::ServerConfig;

const SMS_TIMEOUT: Duration = Duration::from_secs(10);

/// Pick the SMS adapter: the HTTP provider when configured and its client
/// builds, otherwise the log-only gateway.
pub(crate) fn build_sms_gateway(provider: Option<SmsProvider>) -> Arc<dyn SmsGateway> {
    let Some(provider) = provider else {
        info!("no SMS provider configured; messages will be logged");
        return Arc::new(LogSmsGateway);
    };
    let endpoint = provider.endpoint.clone();
    match HttpSmsGateway::new(provider, SMS_TIMEOUT) {
        Ok(gateway) => {
            info!(endpoint = %endpoint, "SMS provider configured");
            Arc::new(gateway)
        }
        Err(err) => {
            warn!(error = %err, "SMS client failed to build; messages will be logged");
            Arc::new(LogSmsGateway)
        }
    }
}

/// Repository-backed ports sharing one pool.
fn build_ports(pool: &DbPool, sms: Arc<dyn SmsGateway>) -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        restaurants: Arc::new(DieselRestaurantRepository::new(pool.clone())),
        reference: Arc::new(DieselReferenceRepository::new(pool.clone())),
        inventory: Arc::new(DieselInventoryRepository::new(pool.clone())),
        sales: Arc::new(DieselSaleRepository::new(pool.clone())),
        expenses: Arc::new(DieselExpenseRepository::new(pool.clone())),
        debts: Arc::new(DieselDebtRepository::new(pool.clone())),
        bank: Arc::new(DieselBankRepository::new(pool.clone())),
        reports: Arc::new(DieselReportRepository::new(pool.clone())),
        passwords: Arc::new(Argon2PasswordHasher::default()),
        sms,
        clock: Arc::new(DefaultClock),
    }
}

/// Build the shared HTTP state from the server configuration.
pub(crate) fn build_http_state(config: &mut ServerConfig) -> web::Data<HttpState> {
    let sms = build_sms_gateway(config.sms.take());
    let ports = build_ports(&config.db_pool, sms);
    if !config.cron_secret.is_configured() {
        warn!("FOURNIL_CRON_SECRET is unset; the cron endpoint will answer 503");
    }
    web::Data::new(HttpState::new(ports, config.cron_secret.clone()))
}

#[cfg(test)]
mod tests {
    //! Adapter selection.
    use rstest::rstest;
    use url::Url;
    use zeroize::Zeroizing;

    use super::*;

    #[rstest]
    #[actix_rt::test]
    async fn missing_provider_falls_back_to_logging() {
        let gateway = build_sms_gateway(None);
        let phone = fournil::domain::PhoneNumber::parse("+224620000000").expect("phone");
        gateway
            .send(&phone, "Stock bas: farine")
            .await
            .expect("log gateway accepts every message");
    }

    #[rstest]
    fn configured_provider_builds() {
        let provider = SmsProvider {
            endpoint: Url::parse("https://sms.example.gn/send").expect("url"),
            api_key: Zeroizing::new("sk-test".to_owned()),
            sender_id: "Fournil".to_owned(),
        };
        let gateway = build_sms_gateway(Some(provider));
        assert_eq!(Arc::strong_count(&gateway), 1);
    }
}
