//! PostgreSQL adapters for the repository ports, built on Diesel.
//!
//! Repositories translate between row structs (`models.rs`) and domain
//! types; every row is re-validated on the way out so a bad stored value
//! surfaces as a query error instead of an invalid aggregate. Multi-row
//! writes run inside one transaction per use-case, and conditional updates
//! carry the state guards so concurrent requests cannot both succeed.
//!
//! ```ignore
//! use fournil::outbound::persistence::{DbPool, DieselSaleRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/fournil")).await?;
//! let sales = DieselSaleRepository::new(pool);
//! ```

mod diesel_bank_repository;
mod diesel_debt_repository;
mod diesel_expense_repository;
pub(crate) mod diesel_helpers;
mod diesel_inventory_repository;
mod diesel_reference_repository;
mod diesel_report_repository;
mod diesel_restaurant_repository;
mod diesel_sale_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_bank_repository::DieselBankRepository;
pub use diesel_debt_repository::DieselDebtRepository;
pub use diesel_expense_repository::DieselExpenseRepository;
pub use diesel_inventory_repository::DieselInventoryRepository;
pub use diesel_reference_repository::DieselReferenceRepository;
pub use diesel_report_repository::DieselReportRepository;
pub use diesel_restaurant_repository::DieselRestaurantRepository;
pub use diesel_sale_repository::DieselSaleRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
