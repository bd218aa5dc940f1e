//! Expenses and their approval.
//!
//! Approving an expense withdraws the amount from its payment method and,
//! when the expense bought stock, books the purchase into inventory at the
//! implied unit cost.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    CategoryId, ContactId, ExpenseGroupId, ExpenseId, Gnf, ItemId, PaymentMethod, Quantity,
    RestaurantId, ReviewStatus, TransactionDirection, TransactionDraft, TransactionReason,
    TransactionSource, UserId,
};

/// Stock bought through an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockPurchase {
    /// Item restocked.
    pub item_id: ItemId,
    /// Quantity received.
    pub quantity: Quantity,
}

/// Money spent by the restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Identifier.
    pub id: ExpenseId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Day of the expense.
    pub date: NaiveDate,
    /// Amount.
    pub amount: Gnf,
    /// Account debited.
    pub method: PaymentMethod,
    /// Expense category.
    pub category_id: CategoryId,
    /// Optional grouping.
    pub group_id: Option<ExpenseGroupId>,
    /// Supplier paid.
    pub supplier_id: Option<ContactId>,
    /// What was bought.
    pub description: Option<String>,
    /// Stock received, if any.
    pub stock_purchase: Option<StockPurchase>,
    /// Workflow status.
    pub status: ReviewStatus,
    /// Why it was rejected.
    pub rejection_reason: Option<String>,
    /// Author.
    pub created_by: UserId,
    /// Reviewer.
    pub reviewed_by: Option<UserId>,
    /// Review time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Withdrawal recorded on approval.
    #[must_use]
    pub fn approval_withdrawal(&self) -> TransactionDraft {
        TransactionDraft {
            date: self.date,
            amount: self.amount,
            direction: TransactionDirection::Withdrawal,
            method: self.method,
            reason: TransactionReason::ExpensePayment,
            source: Some(TransactionSource::expense(self.id)),
            description: self.description.clone(),
        }
    }

    /// Unit cost implied by the stock purchase, rounded to whole francs.
    #[must_use]
    pub fn purchase_unit_cost(&self) -> Option<i64> {
        self.stock_purchase
            .and_then(|purchase| purchase.quantity.unit_price_for(self.amount.get()))
    }
}

/// Editable expense fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    /// Day of the expense.
    pub date: NaiveDate,
    /// Amount; must be positive.
    pub amount: Gnf,
    /// Account debited.
    pub method: PaymentMethod,
    /// Expense category.
    pub category_id: CategoryId,
    /// Optional grouping.
    pub group_id: Option<ExpenseGroupId>,
    /// Supplier paid.
    pub supplier_id: Option<ContactId>,
    /// What was bought.
    pub description: Option<String>,
    /// Stock received.
    pub stock_purchase: Option<StockPurchase>,
}

/// Raised when expense fields are unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseValidationError {
    /// Amount was zero.
    #[error("expense amount must be greater than zero")]
    ZeroAmount,
    /// Purchased quantity was not positive.
    #[error("purchased quantity must be greater than zero")]
    PurchaseNotPositive,
}

impl ExpenseDraft {
    /// Check amount and purchase quantity.
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.amount.is_zero() {
            return Err(ExpenseValidationError::ZeroAmount);
        }
        if self
            .stock_purchase
            .is_some_and(|purchase| !purchase.quantity.is_positive())
        {
            return Err(ExpenseValidationError::PurchaseNotPositive);
        }
        Ok(())
    }
}

/// Filters for the expense list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Restrict to one status.
    pub status: Option<ReviewStatus>,
    /// Restrict to one category.
    pub category_id: Option<CategoryId>,
    /// Restrict to one group.
    pub group_id: Option<ExpenseGroupId>,
    /// Earliest date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive.
    pub to: Option<NaiveDate>,
}
