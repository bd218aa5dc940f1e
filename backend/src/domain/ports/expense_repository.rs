//! Port for expenses.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    BankTransaction, Expense, ExpenseDraft, ExpenseFilter, ExpenseId, ListRequest,
    RestaurantId, StockMovement, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by expense repository adapters.
    pub enum ExpenseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "expense repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "expense repository query failed: {message}",
        /// The expense does not exist.
        NotFound => "expense not found",
        /// The expense left the pending state before the write.
        NotPending => "expense is no longer pending",
        /// The item named by the stock purchase does not exist.
        PurchaseItemNotFound { item_id: String } => "purchased item {item_id} not found",
        /// Booking the stock purchase would make stock negative.
        InsufficientStock { item_id: String, item_name: String } =>
            "insufficient stock of {item_name}",
    }
}

/// Port for expense persistence.
///
/// Every state change is a conditional update on `status = 'pending'`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Insert a pending expense.
    async fn insert(&self, expense: &Expense) -> Result<(), ExpenseRepositoryError>;

    /// One expense.
    async fn find(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
    ) -> Result<Option<Expense>, ExpenseRepositoryError>;

    /// Overwrite a pending expense.
    async fn update_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
        draft: &ExpenseDraft,
    ) -> Result<Expense, ExpenseRepositoryError>;

    /// Approve a pending expense, insert its withdrawal, and book any stock
    /// purchase, atomically.
    async fn approve(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
        reviewer: &UserId,
        reviewed_at: DateTime<Utc>,
        withdrawal: &BankTransaction,
        purchase: Option<StockMovement>,
    ) -> Result<Expense, ExpenseRepositoryError>;

    /// Reject a pending expense.
    async fn reject(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
        reviewer: &UserId,
        reviewed_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<Expense, ExpenseRepositoryError>;

    /// Delete a pending expense.
    async fn delete_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
    ) -> Result<(), ExpenseRepositoryError>;

    /// Expenses newest first, fetching one row past the page limit.
    async fn list(
        &self,
        restaurant_id: &RestaurantId,
        filter: &ExpenseFilter,
        page: &ListRequest,
    ) -> Result<Vec<Expense>, ExpenseRepositoryError>;
}
