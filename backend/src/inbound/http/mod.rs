//! HTTP inbound adapter exposing the REST API.
//!
//! Every resource module exposes `routes(cfg)` registering its handlers;
//! the server mounts them all under `/api/v1`.

pub mod banking;
pub mod cache_control;
pub mod catalogue;
pub mod contacts;
pub mod cron;
pub mod debts;
pub mod error;
pub mod expenses;
pub mod health;
pub mod inventory;
pub mod membership;
pub mod production;
pub mod reports;
pub mod restaurants;
pub mod sales;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(users::routes)
        .configure(restaurants::routes)
        .configure(contacts::routes)
        .configure(catalogue::routes)
        .configure(inventory::routes)
        .configure(production::routes)
        .configure(sales::routes)
        .configure(expenses::routes)
        .configure(debts::routes)
        .configure(banking::routes)
        .configure(reports::routes)
        .configure(cron::routes);
}
