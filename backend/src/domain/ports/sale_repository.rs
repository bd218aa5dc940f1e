//! Port for daily sales.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    BankTransaction, Gnf, ListRequest, RestaurantId, Sale, SaleDraft, SaleFilter, SaleId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by sale repository adapters.
    pub enum SaleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "sale repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "sale repository query failed: {message}",
        /// The sale does not exist.
        NotFound => "sale not found",
        /// A sale already exists for the business date.
        DuplicateDate => "a sale already exists for this date",
        /// The sale left the pending state before the write.
        NotPending => "sale is no longer pending",
    }
}

/// Port for sale persistence.
///
/// Every state change is a conditional update on `status = 'pending'`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Insert a pending sale.
    async fn insert(&self, sale: &Sale) -> Result<(), SaleRepositoryError>;

    /// One sale.
    async fn find(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
    ) -> Result<Option<Sale>, SaleRepositoryError>;

    /// Overwrite a pending sale.
    async fn update_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
        draft: &SaleDraft,
        total: Gnf,
    ) -> Result<Sale, SaleRepositoryError>;

    /// Approve a pending sale and insert its deposits atomically.
    async fn approve(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
        reviewer: &UserId,
        reviewed_at: DateTime<Utc>,
        deposits: &[BankTransaction],
    ) -> Result<Sale, SaleRepositoryError>;

    /// Reject a pending sale.
    async fn reject(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
        reviewer: &UserId,
        reviewed_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<Sale, SaleRepositoryError>;

    /// Delete a pending sale.
    async fn delete_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
    ) -> Result<(), SaleRepositoryError>;

    /// Sales newest first, fetching one row past the page limit.
    async fn list(
        &self,
        restaurant_id: &RestaurantId,
        filter: &SaleFilter,
        page: &ListRequest,
    ) -> Result<Vec<Sale>, SaleRepositoryError>;
}
