//! Port for bank transactions and reconciliations.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    BankTransaction, ListRequest, Reconciliation, ReconciliationId, RestaurantId,
    TransactionAggregate, TransactionFilter, TransactionId, TransactionStatus, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by bank repository adapters.
    pub enum BankRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "bank repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "bank repository query failed: {message}",
        /// The transaction or reconciliation does not exist.
        NotFound => "bank record not found",
        /// The transaction is not pending, or not manual where required.
        NotPending => "transaction is no longer pending",
    }
}

/// Port for bank persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankRepository: Send + Sync {
    /// Transactions newest first, fetching one row past the page limit.
    async fn list(
        &self,
        restaurant_id: &RestaurantId,
        filter: &TransactionFilter,
        page: &ListRequest,
    ) -> Result<Vec<BankTransaction>, BankRepositoryError>;

    /// One transaction.
    async fn find(
        &self,
        restaurant_id: &RestaurantId,
        id: &TransactionId,
    ) -> Result<Option<BankTransaction>, BankRepositoryError>;

    /// Insert a transaction.
    async fn insert(&self, transaction: &BankTransaction) -> Result<(), BankRepositoryError>;

    /// Move a pending transaction to `status`.
    async fn settle(
        &self,
        restaurant_id: &RestaurantId,
        id: &TransactionId,
        status: TransactionStatus,
        actor: &UserId,
        at: DateTime<Utc>,
    ) -> Result<BankTransaction, BankRepositoryError>;

    /// Delete a manual pending transaction.
    async fn delete_manual_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &TransactionId,
    ) -> Result<(), BankRepositoryError>;

    /// Sums grouped by method, direction, and status.
    async fn aggregates(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<TransactionAggregate>, BankRepositoryError>;

    /// Insert a reconciliation and its adjustments atomically.
    async fn insert_reconciliation(
        &self,
        reconciliation: &Reconciliation,
        adjustments: &[BankTransaction],
    ) -> Result<(), BankRepositoryError>;

    /// Reconciliations newest first, fetching one row past the page limit.
    async fn list_reconciliations(
        &self,
        restaurant_id: &RestaurantId,
        page: &ListRequest,
    ) -> Result<Vec<Reconciliation>, BankRepositoryError>;

    /// One reconciliation.
    async fn find_reconciliation(
        &self,
        restaurant_id: &RestaurantId,
        id: &ReconciliationId,
    ) -> Result<Option<Reconciliation>, BankRepositoryError>;
}
