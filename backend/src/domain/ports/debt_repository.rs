//! Port for customer debts and their payments.
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    BankTransaction, CustomerDebtSummary, Debt, DebtFilter, DebtId, DebtPayment, ListRequest,
    PaymentId, RestaurantId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by debt repository adapters.
    pub enum DebtRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "debt repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "debt repository query failed: {message}",
        /// The debt or payment does not exist.
        NotFound => "debt or payment not found",
        /// A concurrent change made the operation invalid.
        StateChanged { message: String } => "debt changed concurrently: {message}",
    }
}

/// Port for debt persistence.
///
/// Payment writes recompute `paid_amount` and `status` in the same
/// transaction and guard on the debt not being written off and the new paid
/// amount not exceeding the debt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DebtRepository: Send + Sync {
    /// Insert a debt.
    async fn insert(&self, debt: &Debt) -> Result<(), DebtRepositoryError>;

    /// One debt.
    async fn find(
        &self,
        restaurant_id: &RestaurantId,
        id: &DebtId,
    ) -> Result<Option<Debt>, DebtRepositoryError>;

    /// Debts newest first, fetching one row past the page limit.
    async fn list(
        &self,
        restaurant_id: &RestaurantId,
        filter: &DebtFilter,
        page: &ListRequest,
    ) -> Result<Vec<Debt>, DebtRepositoryError>;

    /// Payments on a debt, oldest first.
    async fn payments(
        &self,
        restaurant_id: &RestaurantId,
        debt_id: &DebtId,
    ) -> Result<Vec<DebtPayment>, DebtRepositoryError>;

    /// Insert a payment and its deposit, returning the updated debt.
    async fn record_payment(
        &self,
        payment: &DebtPayment,
        deposit: &BankTransaction,
    ) -> Result<Debt, DebtRepositoryError>;

    /// Delete a payment and its deposit, returning the updated debt.
    async fn delete_payment(
        &self,
        restaurant_id: &RestaurantId,
        debt_id: &DebtId,
        payment_id: &PaymentId,
    ) -> Result<Debt, DebtRepositoryError>;

    /// Write off an open debt.
    async fn write_off(
        &self,
        restaurant_id: &RestaurantId,
        id: &DebtId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<Debt, DebtRepositoryError>;

    /// Outstanding balance per customer with open debts.
    async fn customer_summaries(
        &self,
        restaurant_id: &RestaurantId,
        today: NaiveDate,
    ) -> Result<Vec<CustomerDebtSummary>, DebtRepositoryError>;
}
