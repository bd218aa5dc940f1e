//! Inventory, stock ledger, and production use-cases.
//!
//! Quantity only ever changes through movements. The repository applies
//! each movement with a conditional update, so a shortfall surfaces as
//! `InsufficientStock` and nothing is written.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use tracing::info;

use crate::domain::listing::paginate;
use crate::domain::notification_service::Notifier;
use crate::domain::ports::{InventoryRepository, ReferenceRepository, RestaurantRepository};
use crate::domain::reference_service::{require_category, require_contact};
use crate::domain::repository_errors::{map_inventory_error, map_reference_error};
use crate::domain::restaurant_service::load_restaurant;
use crate::domain::{
    Action, BatchId, CategoryKind, ContactId, ContactKind, Error, Ingredient, InventoryItem,
    InventoryItemView, InventorySummary, ItemDraft, ItemId, ListKey, ListPage, ListRequest,
    MemberContext, MovementFilter, MovementId, MovementKind, MovementOutcome, ProductId,
    ProductionBatch, Quantity, Restaurant, StockMovement, low_stock_message, normalize_name,
    normalize_optional_text, summarize_inventory, validate_batch,
};

/// A movement as entered by staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMovement {
    /// Kind of entry.
    pub kind: MovementKind,
    /// Positive for purchase, usage, and waste; signed for adjustments.
    pub quantity: Quantity,
    /// Unit cost paid; purchases only.
    pub unit_cost: Option<i64>,
    /// Supplier; purchases only.
    pub supplier_id: Option<ContactId>,
    /// Free-text reason.
    pub reason: Option<String>,
    /// When it happened; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// A production run as entered by staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBatch {
    /// Product baked.
    pub product_id: ProductId,
    /// Units produced.
    pub quantity_produced: Quantity,
    /// Stock consumed.
    pub ingredients: Vec<Ingredient>,
    /// Notes.
    pub notes: Option<String>,
    /// When the batch was produced; defaults to now.
    pub produced_at: Option<DateTime<Utc>>,
}

/// Inventory service.
#[derive(Clone)]
pub struct InventoryService {
    inventory: Arc<dyn InventoryRepository>,
    reference: Arc<dyn ReferenceRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl InventoryService {
    /// Create the service from its ports.
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        reference: Arc<dyn ReferenceRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inventory,
            reference,
            restaurants,
            notifier,
            clock,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    async fn restaurant(&self, ctx: &MemberContext) -> Result<Restaurant, Error> {
        load_restaurant(self.restaurants.as_ref(), &ctx.restaurant_id).await
    }

    async fn find_item(&self, ctx: &MemberContext, id: &ItemId) -> Result<InventoryItem, Error> {
        self.inventory
            .find_item(&ctx.restaurant_id, id)
            .await
            .map_err(map_inventory_error)?
            .ok_or_else(|| Error::not_found(format!("inventory item {id} not found")))
    }

    /// Items with their stock and expiry status.
    pub async fn list_items(
        &self,
        ctx: &MemberContext,
        include_inactive: bool,
    ) -> Result<Vec<InventoryItemView>, Error> {
        ctx.require(Action::View)?;
        let restaurant = self.restaurant(ctx).await?;
        let today = self.today();
        let items = self
            .inventory
            .list_items(&ctx.restaurant_id, include_inactive)
            .await
            .map_err(map_inventory_error)?;
        Ok(items
            .into_iter()
            .map(|item| InventoryItemView::derive(item, today, restaurant.expiry_warning_days))
            .collect())
    }

    /// One item with its stock and expiry status.
    pub async fn get_item(
        &self,
        ctx: &MemberContext,
        id: &ItemId,
    ) -> Result<InventoryItemView, Error> {
        ctx.require(Action::View)?;
        let restaurant = self.restaurant(ctx).await?;
        let item = self.find_item(ctx, id).await?;
        Ok(InventoryItemView::derive(
            item,
            self.today(),
            restaurant.expiry_warning_days,
        ))
    }

    async fn clean_draft(&self, ctx: &MemberContext, draft: ItemDraft) -> Result<ItemDraft, Error> {
        let name = normalize_name(&draft.name)
            .map_err(|err| Error::invalid_field("name", "empty", err.to_string()))?;
        if draft.min_stock.is_negative() {
            return Err(Error::invalid_field(
                "minStock",
                "negative",
                "minimum stock must not be negative",
            ));
        }
        if draft.unit_cost < 0 {
            return Err(Error::invalid_field(
                "unitCost",
                "negative",
                "unit cost must not be negative",
            ));
        }
        if let Some(category_id) = &draft.category_id {
            require_category(
                self.reference.as_ref(),
                &ctx.restaurant_id,
                category_id,
                CategoryKind::Inventory,
                "categoryId",
            )
            .await?;
        }
        if let Some(supplier_id) = &draft.supplier_id {
            require_contact(
                self.reference.as_ref(),
                &ctx.restaurant_id,
                supplier_id,
                ContactKind::Supplier,
                "supplierId",
            )
            .await?;
        }
        Ok(ItemDraft { name, ..draft })
    }

    /// Create an item. A positive opening quantity is booked as an
    /// adjustment so the ledger accounts for every unit on hand.
    pub async fn create_item(
        &self,
        ctx: &MemberContext,
        draft: ItemDraft,
        initial_quantity: Quantity,
    ) -> Result<InventoryItemView, Error> {
        ctx.require(Action::ManageInventory)?;
        if initial_quantity.is_negative() {
            return Err(Error::invalid_field(
                "quantity",
                "negative",
                "initial quantity must not be negative",
            ));
        }
        let draft = self.clean_draft(ctx, draft).await?;
        let restaurant = self.restaurant(ctx).await?;
        let now = self.clock.utc();
        let item = InventoryItem {
            id: ItemId::random(),
            restaurant_id: ctx.restaurant_id,
            name: draft.name,
            category_id: draft.category_id,
            supplier_id: draft.supplier_id,
            unit: draft.unit,
            quantity: Quantity::ZERO,
            min_stock: draft.min_stock,
            unit_cost: draft.unit_cost,
            shelf_life_days: draft.shelf_life_days,
            last_purchased_at: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let opening = initial_quantity.is_positive().then(|| StockMovement {
            id: MovementId::random(),
            restaurant_id: ctx.restaurant_id,
            item_id: item.id,
            kind: MovementKind::Adjustment,
            quantity_delta: initial_quantity,
            unit_cost: None,
            supplier_id: None,
            reason: Some("opening stock".to_owned()),
            batch_id: None,
            expense_id: None,
            created_by: ctx.user_id,
            occurred_at: now,
        });
        let created = self
            .inventory
            .create_item(&item, opening)
            .await
            .map_err(map_inventory_error)?;
        info!(restaurant_id = %ctx.restaurant_id, item_id = %created.id, "inventory item created");
        Ok(InventoryItemView::derive(
            created,
            now.date_naive(),
            restaurant.expiry_warning_days,
        ))
    }

    /// Edit an item's metadata. Quantity is untouched.
    pub async fn update_item(
        &self,
        ctx: &MemberContext,
        id: &ItemId,
        draft: ItemDraft,
    ) -> Result<InventoryItemView, Error> {
        ctx.require(Action::ManageInventory)?;
        let draft = self.clean_draft(ctx, draft).await?;
        let restaurant = self.restaurant(ctx).await?;
        let now = self.clock.utc();
        let item = self
            .inventory
            .update_item(&ctx.restaurant_id, id, &draft, now)
            .await
            .map_err(map_inventory_error)?
            .ok_or_else(|| Error::not_found(format!("inventory item {id} not found")))?;
        Ok(InventoryItemView::derive(
            item,
            now.date_naive(),
            restaurant.expiry_warning_days,
        ))
    }

    /// Archive or restore an item.
    pub async fn set_item_active(
        &self,
        ctx: &MemberContext,
        id: &ItemId,
        active: bool,
    ) -> Result<(), Error> {
        ctx.require(Action::ManageInventory)?;
        let found = self
            .inventory
            .set_item_active(&ctx.restaurant_id, id, active)
            .await
            .map_err(map_inventory_error)?;
        if !found {
            return Err(Error::not_found(format!("inventory item {id} not found")));
        }
        info!(restaurant_id = %ctx.restaurant_id, item_id = %id, active, "inventory item archived flag changed");
        Ok(())
    }

    /// Value and status counts over active items.
    pub async fn summary(&self, ctx: &MemberContext) -> Result<InventorySummary, Error> {
        ctx.require(Action::View)?;
        let restaurant = self.restaurant(ctx).await?;
        let items = self
            .inventory
            .list_items(&ctx.restaurant_id, false)
            .await
            .map_err(map_inventory_error)?;
        Ok(summarize_inventory(
            &items,
            self.today(),
            restaurant.expiry_warning_days,
        ))
    }

    /// Record one movement against an active item.
    pub async fn record_movement(
        &self,
        ctx: &MemberContext,
        item_id: &ItemId,
        input: RecordMovement,
    ) -> Result<MovementOutcome, Error> {
        ctx.require(Action::RecordStockMovement)?;
        let delta = input
            .kind
            .signed_delta(input.quantity)
            .map_err(|err| Error::invalid_field("quantity", "invalid_quantity", err.to_string()))?;
        let is_purchase = input.kind == MovementKind::Purchase;
        if !is_purchase && (input.unit_cost.is_some() || input.supplier_id.is_some()) {
            return Err(Error::invalid_field(
                "unitCost",
                "purchase_only",
                "unit cost and supplier apply to purchases only",
            ));
        }
        if input.unit_cost.is_some_and(|cost| cost < 0) {
            return Err(Error::invalid_field(
                "unitCost",
                "negative",
                "unit cost must not be negative",
            ));
        }
        let item = self.find_item(ctx, item_id).await?;
        if !item.active {
            return Err(Error::invalid_field(
                "itemId",
                "archived",
                format!("{} is archived", item.name),
            ));
        }
        if let Some(supplier_id) = &input.supplier_id {
            require_contact(
                self.reference.as_ref(),
                &ctx.restaurant_id,
                supplier_id,
                ContactKind::Supplier,
                "supplierId",
            )
            .await?;
        }

        let movement = StockMovement {
            id: MovementId::random(),
            restaurant_id: ctx.restaurant_id,
            item_id: *item_id,
            kind: input.kind,
            quantity_delta: delta,
            unit_cost: input.unit_cost,
            supplier_id: input.supplier_id,
            reason: normalize_optional_text(input.reason.as_deref()),
            batch_id: None,
            expense_id: None,
            created_by: ctx.user_id,
            occurred_at: input.occurred_at.unwrap_or_else(|| self.clock.utc()),
        };
        let outcome = self
            .inventory
            .apply_movement(&movement)
            .await
            .map_err(map_inventory_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            item_id = %item_id,
            kind = %movement.kind,
            delta = %movement.quantity_delta,
            "stock movement recorded"
        );
        if matches!(input.kind, MovementKind::Usage | MovementKind::Waste) {
            self.alert_shortages(ctx, std::slice::from_ref(&outcome))
                .await;
        }
        Ok(outcome)
    }

    async fn alert_shortages(&self, ctx: &MemberContext, outcomes: &[MovementOutcome]) {
        let short: Vec<_> = outcomes
            .iter()
            .filter(|outcome| outcome.crossed_into_shortage())
            .collect();
        if short.is_empty() {
            return;
        }
        let Ok(restaurant) = self.restaurant(ctx).await else {
            return;
        };
        for outcome in short {
            self.notifier
                .notify(&restaurant, &low_stock_message(&restaurant.name, &outcome.item))
                .await;
        }
    }

    /// Ledger entries, newest first.
    pub async fn list_movements(
        &self,
        ctx: &MemberContext,
        filter: &MovementFilter,
        page: &ListRequest,
    ) -> Result<ListPage<StockMovement>, Error> {
        ctx.require(Action::View)?;
        let rows = self
            .inventory
            .list_movements(&ctx.restaurant_id, filter, page)
            .await
            .map_err(map_inventory_error)?;
        paginate(rows, page, |movement| {
            ListKey::new(movement.occurred_at, *movement.id.as_uuid())
        })
    }

    /// Record a production batch, drawing every ingredient from stock in
    /// one transaction.
    pub async fn record_batch(
        &self,
        ctx: &MemberContext,
        input: RecordBatch,
    ) -> Result<ProductionBatch, Error> {
        ctx.require(Action::RecordProduction)?;
        validate_batch(input.quantity_produced, &input.ingredients)
            .map_err(|err| Error::invalid_field("ingredients", "invalid_batch", err.to_string()))?;
        self.reference
            .find_product(&ctx.restaurant_id, &input.product_id)
            .await
            .map_err(map_reference_error)?
            .filter(|product| product.active)
            .ok_or_else(|| {
                Error::invalid_field(
                    "productId",
                    "unknown",
                    format!("product {} not found", input.product_id),
                )
            })?;

        let produced_at = input.produced_at.unwrap_or_else(|| self.clock.utc());
        let batch = ProductionBatch {
            id: BatchId::random(),
            restaurant_id: ctx.restaurant_id,
            product_id: input.product_id,
            quantity_produced: input.quantity_produced,
            ingredients: input.ingredients,
            notes: normalize_optional_text(input.notes.as_deref()),
            produced_at,
            created_by: ctx.user_id,
        };
        let usages: Vec<_> = batch
            .ingredients
            .iter()
            .map(|ingredient| StockMovement {
                id: MovementId::random(),
                restaurant_id: ctx.restaurant_id,
                item_id: ingredient.item_id,
                kind: MovementKind::Usage,
                quantity_delta: -ingredient.quantity,
                unit_cost: None,
                supplier_id: None,
                reason: None,
                batch_id: Some(batch.id),
                expense_id: None,
                created_by: ctx.user_id,
                occurred_at: produced_at,
            })
            .collect();
        let outcomes = self
            .inventory
            .record_batch(&batch, &usages)
            .await
            .map_err(map_inventory_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            batch_id = %batch.id,
            ingredients = usages.len(),
            "production batch recorded"
        );
        self.alert_shortages(ctx, &outcomes).await;
        Ok(batch)
    }

    /// Batches newest first, optionally within a date range.
    pub async fn list_batches(
        &self,
        ctx: &MemberContext,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: &ListRequest,
    ) -> Result<ListPage<ProductionBatch>, Error> {
        ctx.require(Action::View)?;
        let rows = self
            .inventory
            .list_batches(&ctx.restaurant_id, from, to, page)
            .await
            .map_err(map_inventory_error)?;
        paginate(rows, page, |batch| {
            ListKey::new(batch.produced_at, *batch.id.as_uuid())
        })
    }
}

#[cfg(test)]
#[path = "inventory_service_tests.rs"]
mod tests;
