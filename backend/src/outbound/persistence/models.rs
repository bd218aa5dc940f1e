//! Internal Diesel row structs and their conversions to domain types.
//!
//! Rows never leave the persistence layer. Reads go through `TryFrom`, since
//! text codes and amounts are re-validated on the way out; writes borrow from
//! the domain value.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    BankTransaction, Category, Contact, Debt, DebtPayment, EmailAddress, Expense, ExpenseGroup,
    Ingredient, InventoryItem, MethodTotals, PaymentSplit, PhoneNumber, Product,
    ProductionBatch, Quantity, Reconciliation, Restaurant, Sale, StockMovement, StockPurchase,
    TransactionSource, User, discrepancy,
};

use super::diesel_helpers::{RowError, decode_code, decode_gnf, decode_u16};
use super::schema::{
    bank_transactions, batch_ingredients, categories, contacts, debt_payments, debts,
    expense_groups, expenses, inventory_items, production_batches, products, reconciliations,
    restaurants, sales, stock_movements, users,
};

fn decode_phone(column: &'static str, raw: Option<String>) -> Result<Option<PhoneNumber>, RowError> {
    raw.as_deref()
        .map(PhoneNumber::parse)
        .transpose()
        .map_err(|err| RowError::new(column, err))
}

fn split_from(
    cash: i64,
    orange_money: i64,
    card: i64,
) -> Result<PaymentSplit, RowError> {
    Ok(PaymentSplit {
        cash: decode_gnf("cash", cash)?,
        orange_money: decode_gnf("orange_money", orange_money)?,
        card: decode_gnf("card", card)?,
    })
}

// ---------------------------------------------------------------------------
// Users and restaurants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn new(user: &User, password_hash: &str) -> Self {
        Self {
            id: *user.id.as_uuid(),
            display_name: user.display_name.clone(),
            email: user.email.as_str().to_owned(),
            phone: user.phone.as_ref().map(|phone| phone.as_str().to_owned()),
            password_hash: password_hash.to_owned(),
            created_at: user.created_at,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = RowError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            display_name: row.display_name,
            email: EmailAddress::parse(&row.email).map_err(|err| RowError::new("email", err))?,
            phone: decode_phone("phone", row.phone)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestaurantRow {
    pub id: Uuid,
    pub name: String,
    pub notification_phone: Option<String>,
    pub notifications_enabled: bool,
    pub initial_cash: i64,
    pub initial_orange_money: i64,
    pub initial_card: i64,
    pub expiry_warning_days: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Restaurant> for RestaurantRow {
    fn from(value: &Restaurant) -> Self {
        Self {
            id: *value.id.as_uuid(),
            name: value.name.clone(),
            notification_phone: value
                .notification_phone
                .as_ref()
                .map(|phone| phone.as_str().to_owned()),
            notifications_enabled: value.notifications_enabled,
            initial_cash: value.initial_balances.cash.get(),
            initial_orange_money: value.initial_balances.orange_money.get(),
            initial_card: value.initial_balances.card.get(),
            expiry_warning_days: i32::from(value.expiry_warning_days),
            created_at: value.created_at,
        }
    }
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = RowError;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            notification_phone: decode_phone("notification_phone", row.notification_phone)?,
            notifications_enabled: row.notifications_enabled,
            initial_balances: split_from(
                row.initial_cash,
                row.initial_orange_money,
                row.initial_card,
            )?,
            expiry_warning_days: decode_u16("expiry_warning_days", row.expiry_warning_days)?,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub kind: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Contact> for ContactRow {
    fn from(value: &Contact) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            kind: value.kind.as_str().to_owned(),
            name: value.name.clone(),
            phone: value.phone.as_ref().map(|phone| phone.as_str().to_owned()),
            email: value.email.clone(),
            address: value.address.clone(),
            notes: value.notes.clone(),
            active: value.active,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<ContactRow> for Contact {
    type Error = RowError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            kind: decode_code("contacts.kind", &row.kind)?,
            name: row.name,
            phone: decode_phone("contacts.phone", row.phone)?,
            email: row.email,
            address: row.address,
            notes: row.notes,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub kind: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Category> for CategoryRow {
    fn from(value: &Category) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            kind: value.kind.as_str().to_owned(),
            name: value.name.clone(),
            active: value.active,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = RowError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            kind: decode_code("categories.kind", &row.kind)?,
            name: row.name,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = expense_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseGroupRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&ExpenseGroup> for ExpenseGroupRow {
    fn from(value: &ExpenseGroup) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            name: value.name.clone(),
            description: value.description.clone(),
            active: value.active,
            created_at: value.created_at,
        }
    }
}

impl From<ExpenseGroupRow> for ExpenseGroup {
    fn from(row: ExpenseGroupRow) -> Self {
        Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            name: row.name,
            description: row.description,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub unit_price: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductRow {
    fn from(value: &Product) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            name: value.name.clone(),
            category_id: value.category_id.map(|id| *id.as_uuid()),
            unit_price: value.unit_price.get(),
            active: value.active,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = RowError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            name: row.name,
            category_id: row.category_id.map(Into::into),
            unit_price: decode_gnf("products.unit_price", row.unit_price)?,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Inventory and production
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = inventory_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InventoryItemRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub unit: String,
    pub quantity_milli: i64,
    pub min_stock_milli: i64,
    pub unit_cost: i64,
    pub shelf_life_days: Option<i32>,
    pub last_purchased_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&InventoryItem> for InventoryItemRow {
    fn from(value: &InventoryItem) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            name: value.name.clone(),
            category_id: value.category_id.map(|id| *id.as_uuid()),
            supplier_id: value.supplier_id.map(|id| *id.as_uuid()),
            unit: value.unit.as_str().to_owned(),
            quantity_milli: value.quantity.to_milli(),
            min_stock_milli: value.min_stock.to_milli(),
            unit_cost: value.unit_cost,
            shelf_life_days: value.shelf_life_days.map(i32::from),
            last_purchased_at: value.last_purchased_at,
            active: value.active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl TryFrom<InventoryItemRow> for InventoryItem {
    type Error = RowError;

    fn try_from(row: InventoryItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            name: row.name,
            category_id: row.category_id.map(Into::into),
            supplier_id: row.supplier_id.map(Into::into),
            unit: decode_code("inventory_items.unit", &row.unit)?,
            quantity: Quantity::from_milli(row.quantity_milli),
            min_stock: Quantity::from_milli(row.min_stock_milli),
            unit_cost: row.unit_cost,
            shelf_life_days: row
                .shelf_life_days
                .map(|days| decode_u16("inventory_items.shelf_life_days", days))
                .transpose()?,
            last_purchased_at: row.last_purchased_at,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = stock_movements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StockMovementRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub item_id: Uuid,
    pub kind: String,
    pub quantity_delta_milli: i64,
    pub unit_cost: Option<i64>,
    pub supplier_id: Option<Uuid>,
    pub reason: Option<String>,
    pub batch_id: Option<Uuid>,
    pub expense_id: Option<Uuid>,
    pub created_by: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl From<&StockMovement> for StockMovementRow {
    fn from(value: &StockMovement) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            item_id: *value.item_id.as_uuid(),
            kind: value.kind.as_str().to_owned(),
            quantity_delta_milli: value.quantity_delta.to_milli(),
            unit_cost: value.unit_cost,
            supplier_id: value.supplier_id.map(|id| *id.as_uuid()),
            reason: value.reason.clone(),
            batch_id: value.batch_id.map(|id| *id.as_uuid()),
            expense_id: value.expense_id.map(|id| *id.as_uuid()),
            created_by: *value.created_by.as_uuid(),
            occurred_at: value.occurred_at,
        }
    }
}

impl TryFrom<StockMovementRow> for StockMovement {
    type Error = RowError;

    fn try_from(row: StockMovementRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            item_id: row.item_id.into(),
            kind: decode_code("stock_movements.kind", &row.kind)?,
            quantity_delta: Quantity::from_milli(row.quantity_delta_milli),
            unit_cost: row.unit_cost,
            supplier_id: row.supplier_id.map(Into::into),
            reason: row.reason,
            batch_id: row.batch_id.map(Into::into),
            expense_id: row.expense_id.map(Into::into),
            created_by: row.created_by.into(),
            occurred_at: row.occurred_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = production_batches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BatchRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub product_id: Uuid,
    pub quantity_produced_milli: i64,
    pub notes: Option<String>,
    pub produced_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl From<&ProductionBatch> for BatchRow {
    fn from(value: &ProductionBatch) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            product_id: *value.product_id.as_uuid(),
            quantity_produced_milli: value.quantity_produced.to_milli(),
            notes: value.notes.clone(),
            produced_at: value.produced_at,
            created_by: *value.created_by.as_uuid(),
        }
    }
}

impl BatchRow {
    /// Assemble the batch once its ingredient rows are loaded.
    pub(crate) fn into_batch(self, ingredients: Vec<Ingredient>) -> ProductionBatch {
        ProductionBatch {
            id: self.id.into(),
            restaurant_id: self.restaurant_id.into(),
            product_id: self.product_id.into(),
            quantity_produced: Quantity::from_milli(self.quantity_produced_milli),
            ingredients,
            notes: self.notes,
            produced_at: self.produced_at,
            created_by: self.created_by.into(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = batch_ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IngredientRow {
    pub batch_id: Uuid,
    pub item_id: Uuid,
    pub quantity_milli: i64,
}

impl IngredientRow {
    pub(crate) fn new(batch: &ProductionBatch, ingredient: &Ingredient) -> Self {
        Self {
            batch_id: *batch.id.as_uuid(),
            item_id: *ingredient.item_id.as_uuid(),
            quantity_milli: ingredient.quantity.to_milli(),
        }
    }
}

impl From<&IngredientRow> for Ingredient {
    fn from(row: &IngredientRow) -> Self {
        Self {
            item_id: row.item_id.into(),
            quantity: Quantity::from_milli(row.quantity_milli),
        }
    }
}

// ---------------------------------------------------------------------------
// Sales and expenses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SaleRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub business_date: NaiveDate,
    pub cash: i64,
    pub orange_money: i64,
    pub card: i64,
    pub total: i64,
    pub customer_id: Option<Uuid>,
    pub notes: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_by: Uuid,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Sale> for SaleRow {
    fn from(value: &Sale) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            business_date: value.business_date,
            cash: value.amounts.cash.get(),
            orange_money: value.amounts.orange_money.get(),
            card: value.amounts.card.get(),
            total: value.total.get(),
            customer_id: value.customer_id.map(|id| *id.as_uuid()),
            notes: value.notes.clone(),
            status: value.status.as_str().to_owned(),
            rejection_reason: value.rejection_reason.clone(),
            created_by: *value.created_by.as_uuid(),
            reviewed_by: value.reviewed_by.map(|id| *id.as_uuid()),
            reviewed_at: value.reviewed_at,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<SaleRow> for Sale {
    type Error = RowError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            business_date: row.business_date,
            amounts: split_from(row.cash, row.orange_money, row.card)?,
            total: decode_gnf("sales.total", row.total)?,
            customer_id: row.customer_id.map(Into::into),
            notes: row.notes,
            status: decode_code("sales.status", &row.status)?,
            rejection_reason: row.rejection_reason,
            created_by: row.created_by.into(),
            reviewed_by: row.reviewed_by.map(Into::into),
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub expense_date: NaiveDate,
    pub amount: i64,
    pub method: String,
    pub category_id: Uuid,
    pub group_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub description: Option<String>,
    pub purchase_item_id: Option<Uuid>,
    pub purchase_quantity_milli: Option<i64>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_by: Uuid,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseRow {
    fn from(value: &Expense) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            expense_date: value.date,
            amount: value.amount.get(),
            method: value.method.as_str().to_owned(),
            category_id: *value.category_id.as_uuid(),
            group_id: value.group_id.map(|id| *id.as_uuid()),
            supplier_id: value.supplier_id.map(|id| *id.as_uuid()),
            description: value.description.clone(),
            purchase_item_id: value.stock_purchase.map(|p| *p.item_id.as_uuid()),
            purchase_quantity_milli: value.stock_purchase.map(|p| p.quantity.to_milli()),
            status: value.status.as_str().to_owned(),
            rejection_reason: value.rejection_reason.clone(),
            created_by: *value.created_by.as_uuid(),
            reviewed_by: value.reviewed_by.map(|id| *id.as_uuid()),
            reviewed_at: value.reviewed_at,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = RowError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let stock_purchase = match (row.purchase_item_id, row.purchase_quantity_milli) {
            (Some(item_id), Some(milli)) => Some(StockPurchase {
                item_id: item_id.into(),
                quantity: Quantity::from_milli(milli),
            }),
            (None, None) => None,
            _ => {
                return Err(RowError::new(
                    "expenses.purchase_item_id",
                    "item and quantity must be set together",
                ));
            }
        };
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            date: row.expense_date,
            amount: decode_gnf("expenses.amount", row.amount)?,
            method: decode_code("expenses.method", &row.method)?,
            category_id: row.category_id.into(),
            group_id: row.group_id.map(Into::into),
            supplier_id: row.supplier_id.map(Into::into),
            description: row.description,
            stock_purchase,
            status: decode_code("expenses.status", &row.status)?,
            rejection_reason: row.rejection_reason,
            created_by: row.created_by.into(),
            reviewed_by: row.reviewed_by.map(Into::into),
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Debts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = debts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DebtRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub customer_id: Uuid,
    pub sale_id: Option<Uuid>,
    pub amount: i64,
    pub paid_amount: i64,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub written_off_reason: Option<String>,
    pub written_off_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Debt> for DebtRow {
    fn from(value: &Debt) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            customer_id: *value.customer_id.as_uuid(),
            sale_id: value.sale_id.map(|id| *id.as_uuid()),
            amount: value.amount.get(),
            paid_amount: value.paid_amount.get(),
            status: value.status.as_str().to_owned(),
            due_date: value.due_date,
            description: value.description.clone(),
            written_off_reason: value.written_off_reason.clone(),
            written_off_at: value.written_off_at,
            created_by: *value.created_by.as_uuid(),
            created_at: value.created_at,
        }
    }
}

impl TryFrom<DebtRow> for Debt {
    type Error = RowError;

    fn try_from(row: DebtRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            customer_id: row.customer_id.into(),
            sale_id: row.sale_id.map(Into::into),
            amount: decode_gnf("debts.amount", row.amount)?,
            paid_amount: decode_gnf("debts.paid_amount", row.paid_amount)?,
            status: decode_code("debts.status", &row.status)?,
            due_date: row.due_date,
            description: row.description,
            written_off_reason: row.written_off_reason,
            written_off_at: row.written_off_at,
            created_by: row.created_by.into(),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = debt_payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DebtPaymentRow {
    pub id: Uuid,
    pub debt_id: Uuid,
    pub restaurant_id: Uuid,
    pub amount: i64,
    pub method: String,
    pub paid_on: NaiveDate,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&DebtPayment> for DebtPaymentRow {
    fn from(value: &DebtPayment) -> Self {
        Self {
            id: *value.id.as_uuid(),
            debt_id: *value.debt_id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            amount: value.amount.get(),
            method: value.method.as_str().to_owned(),
            paid_on: value.paid_on,
            notes: value.notes.clone(),
            created_by: *value.created_by.as_uuid(),
            created_at: value.created_at,
        }
    }
}

impl TryFrom<DebtPaymentRow> for DebtPayment {
    type Error = RowError;

    fn try_from(row: DebtPaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            debt_id: row.debt_id.into(),
            restaurant_id: row.restaurant_id.into(),
            amount: decode_gnf("debt_payments.amount", row.amount)?,
            method: decode_code("debt_payments.method", &row.method)?,
            paid_on: row.paid_on,
            notes: row.notes,
            created_by: row.created_by.into(),
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Bank
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bank_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BankTransactionRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub transaction_date: NaiveDate,
    pub amount: i64,
    pub direction: String,
    pub method: String,
    pub reason: String,
    pub status: String,
    pub source_kind: Option<String>,
    pub source_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&BankTransaction> for BankTransactionRow {
    fn from(value: &BankTransaction) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            transaction_date: value.date,
            amount: value.amount.get(),
            direction: value.direction.as_str().to_owned(),
            method: value.method.as_str().to_owned(),
            reason: value.reason.as_str().to_owned(),
            status: value.status.as_str().to_owned(),
            source_kind: value.source.map(|s| s.kind.as_str().to_owned()),
            source_id: value.source.map(|s| s.id),
            description: value.description.clone(),
            created_by: *value.created_by.as_uuid(),
            confirmed_by: value.confirmed_by.map(|id| *id.as_uuid()),
            confirmed_at: value.confirmed_at,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<BankTransactionRow> for BankTransaction {
    type Error = RowError;

    fn try_from(row: BankTransactionRow) -> Result<Self, Self::Error> {
        let source = match (row.source_kind, row.source_id) {
            (Some(kind), Some(id)) => Some(TransactionSource {
                kind: decode_code("bank_transactions.source_kind", &kind)?,
                id,
            }),
            (None, None) => None,
            _ => {
                return Err(RowError::new(
                    "bank_transactions.source_kind",
                    "kind and id must be set together",
                ));
            }
        };
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            date: row.transaction_date,
            amount: decode_gnf("bank_transactions.amount", row.amount)?,
            direction: decode_code("bank_transactions.direction", &row.direction)?,
            method: decode_code("bank_transactions.method", &row.method)?,
            reason: decode_code("bank_transactions.reason", &row.reason)?,
            status: decode_code("bank_transactions.status", &row.status)?,
            source,
            description: row.description,
            created_by: row.created_by.into(),
            confirmed_by: row.confirmed_by.map(Into::into),
            confirmed_at: row.confirmed_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reconciliations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReconciliationRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub reconciliation_date: NaiveDate,
    pub expected_cash: i64,
    pub expected_orange_money: i64,
    pub expected_card: i64,
    pub counted_cash: i64,
    pub counted_orange_money: i64,
    pub counted_card: i64,
    pub adjustments_posted: bool,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Reconciliation> for ReconciliationRow {
    fn from(value: &Reconciliation) -> Self {
        Self {
            id: *value.id.as_uuid(),
            restaurant_id: *value.restaurant_id.as_uuid(),
            reconciliation_date: value.date,
            expected_cash: value.expected.cash,
            expected_orange_money: value.expected.orange_money,
            expected_card: value.expected.card,
            counted_cash: value.counted.cash.get(),
            counted_orange_money: value.counted.orange_money.get(),
            counted_card: value.counted.card.get(),
            adjustments_posted: value.adjustments_posted,
            notes: value.notes.clone(),
            created_by: *value.created_by.as_uuid(),
            created_at: value.created_at,
        }
    }
}

impl TryFrom<ReconciliationRow> for Reconciliation {
    type Error = RowError;

    fn try_from(row: ReconciliationRow) -> Result<Self, Self::Error> {
        let expected = MethodTotals {
            cash: row.expected_cash,
            orange_money: row.expected_orange_money,
            card: row.expected_card,
        };
        let counted = split_from(
            row.counted_cash,
            row.counted_orange_money,
            row.counted_card,
        )?;
        Ok(Self {
            id: row.id.into(),
            restaurant_id: row.restaurant_id.into(),
            date: row.reconciliation_date,
            expected,
            counted,
            discrepancy: discrepancy(expected, counted),
            adjustments_posted: row.adjustments_posted,
            notes: row.notes,
            created_by: row.created_by.into(),
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row decoding.
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{PaymentMethod, SourceKind, TransactionStatus};

    #[fixture]
    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0)
            .single()
            .expect("timestamp")
    }

    fn transaction_row(created_at: DateTime<Utc>) -> BankTransactionRow {
        BankTransactionRow {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            transaction_date: created_at.date_naive(),
            amount: 120_000,
            direction: "deposit".to_owned(),
            method: "orange_money".to_owned(),
            reason: "sale_deposit".to_owned(),
            status: "confirmed".to_owned(),
            source_kind: Some("sale".to_owned()),
            source_id: Some(Uuid::new_v4()),
            description: None,
            created_by: Uuid::new_v4(),
            confirmed_by: None,
            confirmed_at: None,
            created_at,
        }
    }

    #[rstest]
    fn transaction_rows_decode_codes_and_source(created_at: DateTime<Utc>) {
        let tx = BankTransaction::try_from(transaction_row(created_at)).expect("decodes");
        assert_eq!(tx.method, PaymentMethod::OrangeMoney);
        assert_eq!(tx.status, TransactionStatus::Confirmed);
        assert_eq!(tx.source.map(|s| s.kind), Some(SourceKind::Sale));
    }

    #[rstest]
    fn half_set_sources_are_rejected(created_at: DateTime<Utc>) {
        let mut row = transaction_row(created_at);
        row.source_id = None;
        assert!(BankTransaction::try_from(row).is_err());
    }

    #[rstest]
    fn negative_amounts_are_rejected(created_at: DateTime<Utc>) {
        let mut row = transaction_row(created_at);
        row.amount = -5;
        let err = BankTransaction::try_from(row).expect_err("negative");
        assert!(err.to_string().contains("bank_transactions.amount"));
    }

    #[rstest]
    fn reconciliation_rows_recompute_the_discrepancy(created_at: DateTime<Utc>) {
        let row = ReconciliationRow {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            reconciliation_date: created_at.date_naive(),
            expected_cash: 200_000,
            expected_orange_money: -10_000,
            expected_card: 0,
            counted_cash: 185_000,
            counted_orange_money: 0,
            counted_card: 0,
            adjustments_posted: false,
            notes: None,
            created_by: Uuid::new_v4(),
            created_at,
        };
        let rec = Reconciliation::try_from(row).expect("decodes");
        assert_eq!(rec.discrepancy.cash, -15_000);
        assert_eq!(rec.discrepancy.orange_money, 10_000);
    }

    #[rstest]
    fn quantities_round_trip_through_thousandths(created_at: DateTime<Utc>) {
        let row = InventoryItemRow {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            name: "Farine T55".to_owned(),
            category_id: None,
            supplier_id: None,
            unit: "kg".to_owned(),
            quantity_milli: 12_500,
            min_stock_milli: 5_000,
            unit_cost: 9_000,
            shelf_life_days: Some(90),
            last_purchased_at: Some(created_at),
            active: true,
            created_at,
            updated_at: created_at,
        };
        let item = InventoryItem::try_from(row).expect("decodes");
        assert_eq!(item.quantity, Quantity::from_milli(12_500));
        assert_eq!(InventoryItemRow::from(&item).quantity_milli, 12_500);
    }
}
