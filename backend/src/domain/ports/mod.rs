//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Each outbound dependency is a trait here; adapters live under
//! `crate::outbound`. Traits are mocked with `mockall` in unit tests.

mod macros;
pub(crate) use macros::define_port_error;

mod bank_repository;
mod debt_repository;
mod expense_repository;
mod inventory_repository;
mod password_hasher;
mod reference_repository;
mod report_repository;
mod restaurant_repository;
mod sale_repository;
mod sms_gateway;
mod user_repository;

#[cfg(test)]
pub use bank_repository::MockBankRepository;
pub use bank_repository::{BankRepository, BankRepositoryError};
#[cfg(test)]
pub use debt_repository::MockDebtRepository;
pub use debt_repository::{DebtRepository, DebtRepositoryError};
#[cfg(test)]
pub use expense_repository::MockExpenseRepository;
pub use expense_repository::{ExpenseRepository, ExpenseRepositoryError};
#[cfg(test)]
pub use inventory_repository::MockInventoryRepository;
pub use inventory_repository::{InventoryRepository, InventoryRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use reference_repository::MockReferenceRepository;
pub use reference_repository::{ReferenceRepository, ReferenceRepositoryError, ReferenceTarget};
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{OverdueDebts, ReportRepository, ReportRepositoryError};
#[cfg(test)]
pub use restaurant_repository::MockRestaurantRepository;
pub use restaurant_repository::{RestaurantRepository, RestaurantRepositoryError};
#[cfg(test)]
pub use sale_repository::MockSaleRepository;
pub use sale_repository::{SaleRepository, SaleRepositoryError};
#[cfg(test)]
pub use sms_gateway::MockSmsGateway;
pub use sms_gateway::{SmsGateway, SmsGatewayError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserRepository, UserRepositoryError};
