//! Port for inventory items, the stock ledger, and production batches.
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    InventoryItem, ItemDraft, ItemId, ListRequest, MovementFilter, MovementOutcome,
    ProductionBatch, RestaurantId, StockMovement,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by inventory repository adapters.
    pub enum InventoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "inventory repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "inventory repository query failed: {message}",
        /// A referenced item does not exist in the restaurant.
        ItemNotFound { item_id: String } => "inventory item {item_id} not found",
        /// Applying the movement would make stock negative.
        InsufficientStock { item_id: String, item_name: String } =>
            "insufficient stock of {item_name}",
    }
}

/// Port for stock persistence.
///
/// Movement writes insert the ledger entry and update the item quantity in
/// one transaction. The quantity update is conditional on the result staying
/// at or above zero; when it is not, nothing is written and
/// [`InventoryRepositoryError::InsufficientStock`] is returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Items by name.
    async fn list_items(
        &self,
        restaurant_id: &RestaurantId,
        include_inactive: bool,
    ) -> Result<Vec<InventoryItem>, InventoryRepositoryError>;

    /// One item.
    async fn find_item(
        &self,
        restaurant_id: &RestaurantId,
        id: &ItemId,
    ) -> Result<Option<InventoryItem>, InventoryRepositoryError>;

    /// Insert an item with zero stock, then apply `opening` if present.
    async fn create_item(
        &self,
        item: &InventoryItem,
        opening: Option<StockMovement>,
    ) -> Result<InventoryItem, InventoryRepositoryError>;

    /// Overwrite an item's editable fields.
    async fn update_item(
        &self,
        restaurant_id: &RestaurantId,
        id: &ItemId,
        draft: &ItemDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<InventoryItem>, InventoryRepositoryError>;

    /// Archive or restore an item. Returns `false` when it does not exist.
    async fn set_item_active(
        &self,
        restaurant_id: &RestaurantId,
        id: &ItemId,
        active: bool,
    ) -> Result<bool, InventoryRepositoryError>;

    /// Record a movement and update the item atomically.
    async fn apply_movement(
        &self,
        movement: &StockMovement,
    ) -> Result<MovementOutcome, InventoryRepositoryError>;

    /// Movements newest first, fetching one row past the page limit.
    async fn list_movements(
        &self,
        restaurant_id: &RestaurantId,
        filter: &MovementFilter,
        page: &ListRequest,
    ) -> Result<Vec<StockMovement>, InventoryRepositoryError>;

    /// Record a batch and all of its usage movements atomically.
    async fn record_batch(
        &self,
        batch: &ProductionBatch,
        usages: &[StockMovement],
    ) -> Result<Vec<MovementOutcome>, InventoryRepositoryError>;

    /// Batches newest first, fetching one row past the page limit.
    async fn list_batches(
        &self,
        restaurant_id: &RestaurantId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: &ListRequest,
    ) -> Result<Vec<ProductionBatch>, InventoryRepositoryError>;
}
