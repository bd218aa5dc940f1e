//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services, which in turn only depend on ports. Handler
//! tests build the same state from `mockall` doubles.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    BankRepository, DebtRepository, ExpenseRepository, InventoryRepository, PasswordHasher,
    ReferenceRepository, ReportRepository, RestaurantRepository, SaleRepository, SmsGateway,
    UserRepository,
};
use crate::domain::{
    AccountService, BankingService, DebtService, ExpenseService, InventoryService,
    NotificationService, Notifier, ReferenceService, ReportService, RestaurantService,
    SalesService,
};
use crate::inbound::http::cron::CronSecret;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub restaurants: Arc<dyn RestaurantRepository>,
    pub reference: Arc<dyn ReferenceRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub sales: Arc<dyn SaleRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
    pub debts: Arc<dyn DebtRepository>,
    pub bank: Arc<dyn BankRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub passwords: Arc<dyn PasswordHasher>,
    pub sms: Arc<dyn SmsGateway>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub restaurants: RestaurantService,
    pub reference: ReferenceService,
    pub inventory: InventoryService,
    pub sales: SalesService,
    pub expenses: ExpenseService,
    pub debts: DebtService,
    pub banking: BankingService,
    pub reports: ReportService,
    pub notifications: NotificationService,
    pub cron_secret: CronSecret,
}

impl HttpState {
    /// Wire every service from the given ports.
    pub fn new(ports: HttpStatePorts, cron_secret: CronSecret) -> Self {
        let HttpStatePorts {
            users,
            restaurants,
            reference,
            inventory,
            sales,
            expenses,
            debts,
            bank,
            reports,
            passwords,
            sms,
            clock,
        } = ports;
        let notifier = Notifier::new(Arc::clone(&sms));

        Self {
            accounts: AccountService::new(
                Arc::clone(&users),
                Arc::clone(&restaurants),
                passwords,
                Arc::clone(&clock),
            ),
            restaurants: RestaurantService::new(
                Arc::clone(&restaurants),
                users,
                Arc::clone(&clock),
            ),
            reference: ReferenceService::new(Arc::clone(&reference), Arc::clone(&clock)),
            inventory: InventoryService::new(
                Arc::clone(&inventory),
                Arc::clone(&reference),
                Arc::clone(&restaurants),
                notifier.clone(),
                Arc::clone(&clock),
            ),
            sales: SalesService::new(
                Arc::clone(&sales),
                Arc::clone(&reference),
                Arc::clone(&restaurants),
                notifier,
                Arc::clone(&clock),
            ),
            expenses: ExpenseService::new(
                expenses,
                Arc::clone(&reference),
                Arc::clone(&inventory),
                Arc::clone(&clock),
            ),
            debts: DebtService::new(debts, reference, sales, Arc::clone(&clock)),
            banking: BankingService::new(bank, Arc::clone(&restaurants), Arc::clone(&clock)),
            reports: ReportService::new(Arc::clone(&reports), Arc::clone(&inventory)),
            notifications: NotificationService::new(restaurants, inventory, reports, sms, clock),
            cron_secret,
        }
    }
}
