//! Inventory items, stock movements, and the pure calculations over them.
//!
//! Stock status, expiry status, and valuation are derived on read and never
//! stored, so they always reflect the current quantity and today's date.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_code_enum;
use super::{
    BatchId, CategoryId, ContactId, ExpenseId, ItemId, MovementId, Quantity, RestaurantId, UserId,
};

define_code_enum! {
    /// Unit an item is counted in.
    pub enum InventoryUnit / ParseInventoryUnitError ("inventory unit") {
        /// Kilograms.
        Kg => "kg",
        /// Grams.
        G => "g",
        /// Litres.
        L => "l",
        /// Millilitres.
        Ml => "ml",
        /// Individual pieces.
        Unit => "unit",
        /// Packs or sacks.
        Pack => "pack",
    }
}

define_code_enum! {
    /// Three-tier stock level classification.
    pub enum StockStatus / ParseStockStatusError ("stock status") {
        /// Above the minimum.
        Ok => "ok",
        /// At or below the minimum.
        Low => "low",
        /// At or below half the minimum, or empty.
        Critical => "critical",
    }
}

define_code_enum! {
    /// Freshness of perishable stock.
    pub enum ExpiryStatus / ParseExpiryStatusError ("expiry status") {
        /// Outside the warning window.
        Fresh => "fresh",
        /// Expires within the warning window.
        Warning => "warning",
        /// Past its expiry date.
        Expired => "expired",
    }
}

define_code_enum! {
    /// Kind of stock ledger entry.
    pub enum MovementKind / ParseMovementKindError ("movement kind") {
        /// Goods received.
        Purchase => "purchase",
        /// Consumed in production or service.
        Usage => "usage",
        /// Spoiled or discarded.
        Waste => "waste",
        /// Correction after a count.
        Adjustment => "adjustment",
    }
}

/// Classify a quantity against the item's minimum stock.
///
/// # Examples
/// ```
/// use fournil::domain::{Quantity, StockStatus, classify_stock};
///
/// let min = Quantity::from_units(10);
/// assert_eq!(classify_stock(Quantity::from_units(11), min), StockStatus::Ok);
/// assert_eq!(classify_stock(Quantity::from_units(10), min), StockStatus::Low);
/// assert_eq!(classify_stock(Quantity::from_units(5), min), StockStatus::Critical);
/// assert_eq!(classify_stock(Quantity::ZERO, Quantity::ZERO), StockStatus::Critical);
/// ```
#[must_use]
pub fn classify_stock(quantity: Quantity, min_stock: Quantity) -> StockStatus {
    let q = i128::from(quantity.to_milli());
    let min = i128::from(min_stock.to_milli());
    if q <= 0 || q * 2 <= min {
        StockStatus::Critical
    } else if q <= min {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

/// Expiry projection for a perishable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryInfo {
    /// Date the current stock expires.
    pub expires_on: NaiveDate,
    /// Calendar days from today; negative once expired.
    pub days_until_expiry: i64,
    /// Derived status.
    pub status: ExpiryStatus,
}

/// Project expiry from the last purchase and the shelf life.
///
/// Returns `None` when either input is missing, meaning expiry is not
/// tracked for the item.
#[must_use]
pub fn project_expiry(
    shelf_life_days: Option<u16>,
    last_purchased_at: Option<DateTime<Utc>>,
    today: NaiveDate,
    warning_days: u16,
) -> Option<ExpiryInfo> {
    let shelf_life = shelf_life_days?;
    let purchased_on = last_purchased_at?.date_naive();
    let expires_on = purchased_on.checked_add_days(Days::new(u64::from(shelf_life)))?;
    let days_until_expiry = (expires_on - today).num_days();
    let status = if days_until_expiry < 0 {
        ExpiryStatus::Expired
    } else if days_until_expiry <= i64::from(warning_days) {
        ExpiryStatus::Warning
    } else {
        ExpiryStatus::Fresh
    };
    Some(ExpiryInfo {
        expires_on,
        days_until_expiry,
        status,
    })
}

/// A stocked ingredient or supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Identifier.
    pub id: ItemId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Name.
    pub name: String,
    /// Inventory category.
    pub category_id: Option<CategoryId>,
    /// Usual supplier.
    pub supplier_id: Option<ContactId>,
    /// Counting unit.
    pub unit: InventoryUnit,
    /// Quantity on hand; never negative.
    pub quantity: Quantity,
    /// Reorder threshold.
    pub min_stock: Quantity,
    /// Cost per unit in GNF.
    pub unit_cost: i64,
    /// Shelf life after purchase.
    pub shelf_life_days: Option<u16>,
    /// Time of the last purchase movement.
    pub last_purchased_at: Option<DateTime<Utc>>,
    /// False once archived.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Current stock status.
    #[must_use]
    pub fn stock_status(&self) -> StockStatus {
        classify_stock(self.quantity, self.min_stock)
    }

    /// Expiry projection for `today`.
    #[must_use]
    pub fn expiry(&self, today: NaiveDate, warning_days: u16) -> Option<ExpiryInfo> {
        project_expiry(
            self.shelf_life_days,
            self.last_purchased_at,
            today,
            warning_days,
        )
    }

    /// Stock value rounded to whole francs.
    #[must_use]
    pub fn stock_value(&self) -> i64 {
        self.quantity.value_at(self.unit_cost)
    }
}

/// An item together with its derived statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    /// The stored item.
    #[serde(flatten)]
    pub item: InventoryItem,
    /// Stock level classification.
    pub stock_status: StockStatus,
    /// Expiry projection when tracked.
    pub expiry: Option<ExpiryInfo>,
    /// Stock value in GNF.
    pub stock_value: i64,
}

impl InventoryItemView {
    /// Derive statuses for `today`.
    #[must_use]
    pub fn derive(item: InventoryItem, today: NaiveDate, warning_days: u16) -> Self {
        Self {
            stock_status: item.stock_status(),
            expiry: item.expiry(today, warning_days),
            stock_value: item.stock_value(),
            item,
        }
    }
}

/// Editable item fields. Quantity changes go through stock movements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    /// Name.
    pub name: String,
    /// Inventory category.
    pub category_id: Option<CategoryId>,
    /// Usual supplier.
    pub supplier_id: Option<ContactId>,
    /// Counting unit.
    pub unit: InventoryUnit,
    /// Reorder threshold.
    pub min_stock: Quantity,
    /// Cost per unit in GNF.
    pub unit_cost: i64,
    /// Shelf life after purchase.
    pub shelf_life_days: Option<u16>,
}

/// Count of items per stock status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockStatusCounts {
    /// Items above minimum.
    pub ok: u32,
    /// Items at or below minimum.
    pub low: u32,
    /// Items at or below half the minimum.
    pub critical: u32,
}

/// Value of the stock in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryValuation {
    /// Category, or `None` for uncategorised items.
    pub category_id: Option<CategoryId>,
    /// Items counted.
    pub item_count: u32,
    /// Value in GNF.
    pub value: i64,
}

/// Snapshot of the whole inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    /// Active items counted.
    pub item_count: u32,
    /// Total value in GNF.
    pub total_value: i64,
    /// Items per stock status.
    pub status_counts: StockStatusCounts,
    /// Items past expiry.
    pub expired_count: u32,
    /// Items inside the warning window.
    pub expiring_count: u32,
    /// Value per category.
    pub by_category: Vec<CategoryValuation>,
}

/// Summarise active items for `today`.
#[must_use]
pub fn summarize_inventory(
    items: &[InventoryItem],
    today: NaiveDate,
    warning_days: u16,
) -> InventorySummary {
    let mut status_counts = StockStatusCounts::default();
    let mut by_category: BTreeMap<Option<CategoryId>, CategoryValuation> = BTreeMap::new();
    let mut total_value = 0_i64;
    let mut item_count = 0_u32;
    let mut expired_count = 0_u32;
    let mut expiring_count = 0_u32;

    for item in items.iter().filter(|item| item.active) {
        item_count += 1;
        let value = item.stock_value();
        total_value = total_value.saturating_add(value);
        match item.stock_status() {
            StockStatus::Ok => status_counts.ok += 1,
            StockStatus::Low => status_counts.low += 1,
            StockStatus::Critical => status_counts.critical += 1,
        }
        match item.expiry(today, warning_days).map(|info| info.status) {
            Some(ExpiryStatus::Expired) => expired_count += 1,
            Some(ExpiryStatus::Warning) => expiring_count += 1,
            Some(ExpiryStatus::Fresh) | None => {}
        }
        let entry = by_category
            .entry(item.category_id)
            .or_insert_with(|| CategoryValuation {
                category_id: item.category_id,
                item_count: 0,
                value: 0,
            });
        entry.item_count += 1;
        entry.value = entry.value.saturating_add(value);
    }

    InventorySummary {
        item_count,
        total_value,
        status_counts,
        expired_count,
        expiring_count,
        by_category: by_category.into_values().collect(),
    }
}

/// Raised when a movement request is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MovementValidationError {
    /// Purchase, usage, and waste take a positive quantity.
    #[error("quantity must be greater than zero")]
    NotPositive,
    /// Adjustments must change something.
    #[error("adjustment quantity must not be zero")]
    ZeroAdjustment,
}

impl MovementKind {
    /// Convert the quantity entered by staff into the signed ledger delta.
    ///
    /// Usage and waste are entered as positive amounts and stored as
    /// withdrawals; adjustments are signed as entered.
    pub fn signed_delta(self, entered: Quantity) -> Result<Quantity, MovementValidationError> {
        match self {
            Self::Adjustment if entered.is_zero() => Err(MovementValidationError::ZeroAdjustment),
            Self::Adjustment => Ok(entered),
            _ if !entered.is_positive() => Err(MovementValidationError::NotPositive),
            Self::Purchase => Ok(entered),
            Self::Usage | Self::Waste => Ok(-entered),
        }
    }
}

/// One entry in the stock ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    /// Identifier.
    pub id: MovementId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Item affected.
    pub item_id: ItemId,
    /// Kind of entry.
    pub kind: MovementKind,
    /// Signed change to the quantity on hand.
    pub quantity_delta: Quantity,
    /// Unit cost paid, for purchases.
    pub unit_cost: Option<i64>,
    /// Supplier, for purchases.
    pub supplier_id: Option<ContactId>,
    /// Free-text reason.
    pub reason: Option<String>,
    /// Production batch that consumed the stock.
    pub batch_id: Option<BatchId>,
    /// Expense that paid for the stock.
    pub expense_id: Option<ExpenseId>,
    /// Author.
    pub created_by: UserId,
    /// When the movement happened.
    pub occurred_at: DateTime<Utc>,
}

/// Item state after a movement has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementOutcome {
    /// The recorded movement.
    pub movement: StockMovement,
    /// Quantity before the movement.
    pub previous_quantity: Quantity,
    /// The updated item.
    pub item: InventoryItem,
}

impl MovementOutcome {
    /// True when this movement pushed the item from `Ok` into `Low` or
    /// `Critical`.
    #[must_use]
    pub fn crossed_into_shortage(&self) -> bool {
        classify_stock(self.previous_quantity, self.item.min_stock) == StockStatus::Ok
            && self.item.stock_status() != StockStatus::Ok
    }
}

/// Filters for the movement ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementFilter {
    /// Restrict to one item.
    pub item_id: Option<ItemId>,
    /// Restrict to one kind.
    pub kind: Option<MovementKind>,
    /// Earliest occurrence date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest occurrence date, inclusive.
    pub to: Option<NaiveDate>,
}
