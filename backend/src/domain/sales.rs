//! Daily sales declarations and their approval.
//!
//! A restaurant declares one sale per business date, split by payment
//! method. Approval turns each non-zero part into a deposit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{
    ContactId, Gnf, PaymentSplit, RestaurantId, ReviewStatus, SaleId, TransactionDraft,
    TransactionReason, TransactionSource, UserId,
};

/// A day's takings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Identifier.
    pub id: SaleId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Trading day.
    pub business_date: NaiveDate,
    /// Amounts per payment method.
    pub amounts: PaymentSplit,
    /// Sum of `amounts`.
    pub total: Gnf,
    /// Customer, for credit or invoiced sales.
    pub customer_id: Option<ContactId>,
    /// Notes.
    pub notes: Option<String>,
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

impl Sale {
    /// Deposits created on approval, one per non-zero payment method.
    ///
    /// # Examples
    /// ```
    /// # use chrono::{NaiveDate, Utc};
    /// # use fournil::domain::*;
    /// let sale = Sale {
    ///     id: SaleId::random(),
    ///     restaurant_id: RestaurantId::random(),
    ///     business_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
    ///     amounts: PaymentSplit { card: Gnf::new(25_000).unwrap(), ..PaymentSplit::default() },
    ///     total: Gnf::new(25_000).unwrap(),
    ///     customer_id: None,
    ///     notes: None,
    ///     status: ReviewStatus::Pending,
    ///     rejection_reason: None,
    ///     created_by: UserId::random(),
    ///     reviewed_by: None,
    ///     reviewed_at: None,
    ///     created_at: Utc::now(),
    /// };
    /// let deposits = sale.approval_deposits();
    /// assert_eq!(deposits.len(), 1);
    /// assert_eq!(deposits[0].method, PaymentMethod::Card);
    /// ```
    #[must_use]
    pub fn approval_deposits(&self) -> Vec<TransactionDraft> {
        self.amounts
            .parts()
            .map(|(method, amount)| {
                let mut draft = TransactionDraft::deposit(
                    self.business_date,
                    method,
                    amount,
                    TransactionReason::SaleDeposit,
                    TransactionSource::sale(self.id),
                );
                draft.description = Some(format!("Sales of {}", self.business_date));
                draft
            })
            .collect()
    }
}

/// Editable sale fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraft {
    /// Trading day.
    pub business_date: NaiveDate,
    /// Amounts per payment method.
    pub amounts: PaymentSplit,
    /// Customer.
    pub customer_id: Option<ContactId>,
    /// Notes.
    pub notes: Option<String>,
}

/// Raised when sale amounts are unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SaleValidationError {
    /// All methods were zero.
    #[error("sale total must be greater than zero")]
    ZeroTotal,
    /// The sum overflowed.
    #[error("sale total is too large")]
    Overflow,
}

impl SaleDraft {
    /// Validate the split and return its total.
    pub fn total(&self) -> Result<Gnf, SaleValidationError> {
        let total = self
            .amounts
            .total()
            .map_err(|_| SaleValidationError::Overflow)?;
        if total.is_zero() {
            Err(SaleValidationError::ZeroTotal)
        } else {
            Ok(total)
        }
    }
}

/// Filters for the sale list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    /// Restrict to one status.
    pub status: Option<ReviewStatus>,
    /// Earliest business date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest business date, inclusive.
    pub to: Option<NaiveDate>,
}
